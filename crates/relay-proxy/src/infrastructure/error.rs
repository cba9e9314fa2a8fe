//! Error types for the I/O layer: sockets and the config file.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while binding, resolving or dialling.
///
/// Bind failures are fatal to the process; resolve and dial failures only
/// end the session that hit them.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The listen address could not be bound.
    #[error("can't listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Name resolution failed for an address.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Name resolution succeeded but returned no addresses.
    #[error("{addr} resolved to no addresses")]
    NoAddresses { addr: String },

    /// Every resolved address refused or failed the connection.
    #[error("Dial failed: {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while loading the TOML config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
