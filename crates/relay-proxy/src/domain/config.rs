//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for all runtime settings.
//! It is assembled from up to three layers, highest precedence first:
//!
//! 1. command-line flags and their environment variables,
//! 2. the optional TOML config file,
//! 3. built-in defaults ([`RelayConfig::default`]).
//!
//! Each of the first two layers is expressed as a [`ConfigOverrides`] with
//! every field optional; [`ConfigOverrides::over`] stacks them and
//! [`ConfigOverrides::resolve`] fills the gaps from the defaults and
//! validates the result.  No I/O happens here: the infrastructure layer reads
//! the file and `main.rs` parses the flags.

use std::path::PathBuf;
use std::time::Duration;

use relay_core::LogFormat;
use thiserror::Error;

pub const DEFAULT_LOCAL_ADDR: &str = "localhost:9000";
pub const DEFAULT_REMOTE_ADDR: &str = "remote:9000";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FORMAT: &str = "plain";

/// Validation failures for configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// An address is not of the form `host:port` with a numeric port.
    #[error("invalid {field} address '{value}': expected host:port")]
    InvalidAddress { field: &'static str, value: String },
}

/// All runtime configuration for the relay.
///
/// Built once at startup and shared read-only with every session.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// `host:port` the relay listens on.  Resolved when the listener binds.
    pub local_addr: String,

    /// `host:port` dialled once per accepted connection.  Resolved on every
    /// dial, so DNS changes are picked up without a restart.
    pub remote_addr: String,

    /// Intended I/O timeout for the remote connection.
    ///
    /// Carried and reported, but not applied as a read or write deadline:
    /// sessions end only on EOF or errors.
    pub remote_timeout: Duration,

    /// Append-mode file that mirrors every log record.  `None` disables it.
    pub log_file: Option<PathBuf>,

    /// Which representations each record contains.
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    /// | Field          | Default          |
    /// |----------------|------------------|
    /// | local_addr     | `localhost:9000` |
    /// | remote_addr    | `remote:9000`    |
    /// | remote_timeout | 30 seconds       |
    /// | log_file       | disabled         |
    /// | log_format     | `plain`          |
    fn default() -> Self {
        Self {
            local_addr: DEFAULT_LOCAL_ADDR.to_string(),
            remote_addr: DEFAULT_REMOTE_ADDR.to_string(),
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
            log_file: None,
            log_format: LogFormat::default(),
        }
    }
}

/// One configuration layer: every setting optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub local_addr: Option<String>,
    pub remote_addr: Option<String>,
    pub remote_timeout_secs: Option<u64>,
    /// An empty path disables the log file, even if a lower layer set one.
    pub log_file: Option<PathBuf>,
    /// Comma-separated selector, e.g. `fhex,plain`.
    pub log_format: Option<String>,
}

/// A validated [`RelayConfig`] plus anything worth warning about.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: RelayConfig,
    /// Log format tokens that were not recognised and therefore ignored.
    pub ignored_format_tokens: Vec<String>,
}

impl ConfigOverrides {
    /// Stacks `self` on top of `lower`: fields set in `self` win.
    pub fn over(self, lower: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            local_addr: self.local_addr.or(lower.local_addr),
            remote_addr: self.remote_addr.or(lower.remote_addr),
            remote_timeout_secs: self.remote_timeout_secs.or(lower.remote_timeout_secs),
            log_file: self.log_file.or(lower.log_file),
            log_format: self.log_format.or(lower.log_format),
        }
    }

    /// Fills unset fields from [`RelayConfig::default`] and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if the listen address is not
    /// `host:port` with a valid port number.  The remote address is only
    /// checked when a session dials it, so a bad remote fails that session
    /// rather than startup.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let defaults = RelayConfig::default();

        let local_addr = normalise_listen_addr(
            self.local_addr.unwrap_or(defaults.local_addr),
        );
        validate_host_port("local", &local_addr)?;

        let remote_addr = self.remote_addr.unwrap_or(defaults.remote_addr);

        let remote_timeout = self
            .remote_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.remote_timeout);

        let log_file = self.log_file.filter(|p| !p.as_os_str().is_empty());

        let outcome = LogFormat::parse(self.log_format.as_deref().unwrap_or(DEFAULT_LOG_FORMAT));

        Ok(ResolvedConfig {
            config: RelayConfig {
                local_addr,
                remote_addr,
                remote_timeout,
                log_file,
                log_format: outcome.format,
            },
            ignored_format_tokens: outcome.ignored,
        })
    }
}

/// `:9000` means "every interface", as with most listen flags.
fn normalise_listen_addr(addr: String) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr
    }
}

/// Checks the `host:port` shape without resolving the host.
fn validate_host_port(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
    };

    let (host, port) = value.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(invalid());
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
