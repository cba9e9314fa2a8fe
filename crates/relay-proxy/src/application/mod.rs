//! Application layer for the relay.
//!
//! Knows *what* happens to each session's bytes, independent of where the
//! streams come from: any `AsyncRead + AsyncWrite` pair can be piped, which
//! is how the tests drive it with in-memory streams.
//!
//! # Responsibilities
//!
//! - Turning each connection's reads into frames ([`frame_reader`])
//! - Forwarding frames between the two connections and logging them ([`pipe`])
//! - Defining where records go ([`sink::RecordSink`])
//!
//! # What does NOT belong here?
//!
//! - Binding, accepting or dialling sockets (infrastructure)
//! - Writing to the console or opening files (infrastructure)

pub mod frame_reader;
pub mod pipe;
pub mod sink;

pub use frame_reader::FrameReader;
pub use pipe::{pipe, DirectionStats, PipeContext, PipeSummary, Side};
pub use sink::{MemorySink, RecordSink};
