//! Domain layer for the relay.
//!
//! Pure configuration types with no dependencies on I/O, sockets or the
//! async runtime.  Session ids, frames and the record format live in
//! `relay-core`; this layer only adds what is specific to running the relay
//! process.

pub mod config;

pub use config::{ConfigError, ConfigOverrides, RelayConfig, ResolvedConfig};
