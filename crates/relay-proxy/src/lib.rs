//! relay-proxy library crate.
//!
//! A transparent TCP reverse relay: it listens on a local address, dials a
//! fixed remote address for every client that connects, and forwards bytes
//! in both directions unchanged.  Every chunk it forwards can also be logged
//! as a record (raw text, a hex dump, a hex string, or any combination).
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! client ──TCP──> [relay-proxy] ──TCP──> remote
//!   ├── domain/           RelayConfig and configuration layering
//!   ├── application/      Frame readers, the duplex pipe, the sink trait
//!   └── infrastructure/
//!         ├── server/       Accept loop, one task per session
//!         ├── dialer/       Outbound connection per session
//!         ├── console_sink/ stdout + append-mode log file
//!         └── config_file/  Optional TOML settings
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `relay-core`, and is generic over
//!   `AsyncRead + AsyncWrite`, so it never sees a real socket.
//! - `infrastructure` depends on all other layers plus `tokio::net`.
//!
//! # For beginners: why split the pipe from the server?
//!
//! The pipe only needs "something I can read from and write to".  Keeping
//! sockets out of it means the tests can drive a whole session through
//! in-memory streams and check every logged record, with no ports involved.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: per-session forwarding and record logging.
pub mod application;

/// Infrastructure layer: listener, dialer, console sink, config file.
pub mod infrastructure;
