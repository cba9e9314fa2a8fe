//! Optional TOML config file.
//!
//! Every key is optional; anything missing falls through to the command line
//! defaults.  Example:
//!
//! ```toml
//! [relay]
//! local = "0.0.0.0:9000"
//! remote = "db.internal:5432"
//! timeout_secs = 30
//! log_file = "/var/log/reverse-relay.log"
//! log_format = "fhex,plain"
//! ```
//!
//! Unknown keys are rejected so a misspelt setting is caught at startup
//! instead of being silently ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::ConfigOverrides;
use crate::infrastructure::error::ConfigFileError;

/// Top-level file layout.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub relay: RelaySection,
}

/// The `[relay]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    pub local: Option<String>,
    pub remote: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_format: Option<String>,
}

impl ConfigFile {
    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Parse`] for invalid TOML, wrong value types
    /// or unknown keys.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] if the file cannot be read, or
    /// [`ConfigFileError::Parse`] if it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Converts the file into a configuration layer.
    pub fn into_overrides(self) -> ConfigOverrides {
        let RelaySection {
            local,
            remote,
            timeout_secs,
            log_file,
            log_format,
        } = self.relay;

        ConfigOverrides {
            local_addr: local,
            remote_addr: remote,
            remote_timeout_secs: timeout_secs,
            log_file,
            log_format,
        }
    }
}
