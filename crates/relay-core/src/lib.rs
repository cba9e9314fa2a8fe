//! # relay-core
//!
//! Shared library for the reverse TCP relay containing the record formatter,
//! session identity types and the frame types exchanged between a connection
//! reader and the duplex pipe.
//!
//! This crate has no dependencies on sockets, async runtimes, or the file
//! system.  Everything here is plain data and pure functions, which keeps the
//! logging format easy to test byte-for-byte.
//!
//! # Architecture overview (for beginners)
//!
//! The relay accepts a client connection, dials a fixed remote address, and
//! copies bytes in both directions until one side hangs up.  Every chunk it
//! copies can be mirrored to the console and a log file.  This crate defines:
//!
//! - **`format`** – How a chunk is rendered for the log: a header line plus
//!   any combination of a hex dump, a contiguous hex string and the raw
//!   bytes, selected by a [`LogFormat`] bitmask.
//!
//! - **`session`** – The [`SessionId`] that tags every record, and the
//!   thread-safe [`SessionCounter`] that hands them out.
//!
//! - **`frame`** – The [`Chunk`] and [`Frame`] values a connection reader
//!   produces: one frame per read call, then a single end-of-stream frame.

pub mod format;
pub mod frame;
pub mod session;

// Re-export the most-used types at the crate root so callers can write
// `relay_core::LogFormat` instead of `relay_core::format::flags::LogFormat`.
pub use format::flags::{FormatParseOutcome, LogFormat};
pub use format::hexdump::hex_dump;
pub use format::record::{error_line, format_record, Direction};
pub use frame::{Chunk, Frame, StreamEnd, BUFFER_CAPACITY};
pub use session::{SessionCounter, SessionId};
