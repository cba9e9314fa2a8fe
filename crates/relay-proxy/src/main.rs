//! Reverse relay: entry point.
//!
//! Listens on a local address and, for every client that connects, dials a
//! fixed remote address and forwards bytes both ways unchanged.  Each chunk
//! forwarded can be echoed to stdout (and an optional log file) as plain
//! text, a hex dump, a hex string, or any combination of the three.
//!
//! # Usage
//!
//! ```text
//! reverse-relay [OPTIONS]
//!
//! Options:
//!   -l, --local <HOST:PORT>    Listen address [default: localhost:9000]
//!   -r, --remote <HOST:PORT>   Remote address [default: remote:9000]
//!   -t, --timeout <SECS>       Remote timeout in seconds [default: 30]
//!       --log <PATH>           Append every record to this file
//!       --lf, --log-format <SELECTOR>
//!                              Any of all,fhex,hex,plain [default: plain]
//!   -c, --config <PATH>        TOML config file
//! ```
//!
//! The single-dash spellings `-lf` and `-log` (with a separate value or with
//! `=VALUE`) are rewritten to `--lf` and `--log` before parsing; otherwise
//! `-lf fhex` would parse as `-l f`.
//!
//! # Environment variable overrides
//!
//! | Variable           | Flag           |
//! |--------------------|----------------|
//! | `RELAY_LOCAL`      | `--local`      |
//! | `RELAY_REMOTE`     | `--remote`     |
//! | `RELAY_TIMEOUT`    | `--timeout`    |
//! | `RELAY_LOG_FILE`   | `--log`        |
//! | `RELAY_LOG_FORMAT` | `--log-format` |
//! | `RELAY_CONFIG`     | `--config`     |
//!
//! Precedence is flag, then environment variable, then config file, then the
//! built-in default.
//!
//! # Output streams
//!
//! Records go to stdout.  Diagnostics (`tracing`, level from `RUST_LOG`) go
//! to stderr, so `reverse-relay > traffic.log` captures only traffic.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use relay_proxy::domain::{ConfigOverrides, ResolvedConfig};
use relay_proxy::infrastructure::{run_server, ConfigFile};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Transparent TCP reverse relay with optional traffic logging.
///
/// Every field is optional so that unset flags fall through to the config
/// file and then to the built-in defaults.
#[derive(Debug, Parser)]
#[command(
    name = "reverse-relay",
    about = "Transparent TCP reverse relay with optional hex/plain traffic logging",
    version
)]
struct Cli {
    /// Address to listen on, as host:port.  `:PORT` listens on every interface.
    #[arg(short = 'l', long = "local", env = "RELAY_LOCAL", value_name = "HOST:PORT")]
    local: Option<String>,

    /// Address to dial for every accepted connection, as host:port.
    #[arg(short = 'r', long = "remote", env = "RELAY_REMOTE", value_name = "HOST:PORT")]
    remote: Option<String>,

    /// Remote connection timeout in seconds.
    ///
    /// Reported at startup; not applied as a read or write deadline.
    #[arg(short = 't', long = "timeout", env = "RELAY_TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,

    /// Append every record to this file as well as stdout.
    #[arg(long = "log", env = "RELAY_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Comma-separated record formats: any of all, fhex, hex, plain.
    #[arg(
        long = "log-format",
        alias = "lf",
        env = "RELAY_LOG_FORMAT",
        value_name = "SELECTOR"
    )]
    log_format: Option<String>,

    /// TOML config file with a [relay] table.
    #[arg(short = 'c', long = "config", env = "RELAY_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// The command-line layer of the configuration.
    fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            local_addr: self.local.clone(),
            remote_addr: self.remote.clone(),
            remote_timeout_secs: self.timeout,
            log_file: self.log_file.clone(),
            log_format: self.log_format.clone(),
        }
    }

    /// Loads the config file (if any), stacks the flags on top and resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if the
    /// listen address is not `host:port`.
    fn resolve_config(&self) -> anyhow::Result<ResolvedConfig> {
        let file_layer = match &self.config {
            Some(path) => ConfigFile::load(path)
                .with_context(|| format!("couldn't load config file {}", path.display()))?
                .into_overrides(),
            None => ConfigOverrides::default(),
        };

        self.to_overrides()
            .over(file_layer)
            .resolve()
            .context("invalid configuration")
    }
}

/// Single-dash long flags accepted for compatibility, and their clap names.
const SINGLE_DASH_LONG_FLAGS: [(&str, &str); 2] = [("-lf", "--lf"), ("-log", "--log")];

/// Rewrites `-lf`/`-log` (and their `=VALUE` forms) to the double-dash
/// spelling.  Arguments after a bare `--` are left alone.
fn normalise_single_dash_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut after_separator = false;
    args.into_iter()
        .map(|arg| {
            if after_separator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                after_separator = true;
                return arg;
            }
            for (single, double) in SINGLE_DASH_LONG_FLAGS {
                if text == single {
                    return OsString::from(double);
                }
                if let Some(value) = text.strip_prefix(single).and_then(|r| r.strip_prefix('=')) {
                    return OsString::from(format!("{double}={value}"));
                }
            }
            arg
        })
        .collect()
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // stderr, not stdout: stdout carries the traffic records.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let cli = Cli::parse_from(normalise_single_dash_flags(std::env::args_os()));
    let ResolvedConfig {
        config,
        ignored_format_tokens,
    } = cli.resolve_config()?;

    for token in &ignored_format_tokens {
        warn!("ignoring unknown log format '{token}' (expected all, fhex, hex or plain)");
    }
    if config.log_format.is_empty() {
        warn!("no log format selected; records will carry only their header");
    } else {
        info!("log formats: {}", config.log_format);
    }
    info!(
        "remote timeout {}s (not enforced as a deadline)",
        config.remote_timeout.as_secs()
    );
    if let Some(path) = &config.log_file {
        info!("log file: {}", path.display());
    }

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, stopping accept loop");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Main server loop ──────────────────────────────────────────────────────
    run_server(config, running).await?;

    info!("reverse relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
