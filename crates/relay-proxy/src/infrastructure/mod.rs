//! Infrastructure layer for the relay.
//!
//! Everything that touches the operating system lives here: sockets, the
//! console, the log file and the config file on disk.
//!
//! # Responsibilities
//!
//! - Binding the listener and running the accept loop ([`server`])
//! - Dialling the remote address for each session ([`dialer`])
//! - Writing records to stdout and the optional log file ([`console_sink`])
//! - Loading the optional TOML config file ([`config_file`])
//! - Stopping the accept loop when the shutdown flag is cleared
//!
//! # What does NOT belong here?
//!
//! - Forwarding and logging logic for a session (application layer)
//! - Record formatting (that is `relay-core`)
//! - Command-line parsing (that is done in `main.rs`)

pub mod config_file;
pub mod console_sink;
pub mod dialer;
pub mod error;
pub mod server;

pub use config_file::ConfigFile;
pub use console_sink::ConsoleSink;
pub use error::{ConfigFileError, RelayError};
pub use server::{run_server, RelayServer};
