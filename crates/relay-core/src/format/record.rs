//! Per-chunk log record layout.
//!
//! A record is a sequence of parts joined by `\n`:
//!
//! ```text
//! id: 000000007,2026-01-02 03:04:05.000006 +00:00,LOCAL>>>>>>>>>>   header
//! 00000000  41 42 ...                                |AB|          hex dump   (fhex)
//!                                                                  (dump ends in \n)
//! 4142                                                             hex string (hex)
//! AB                                                               raw bytes  (plain)
//!                                                                  blank line
//! ```
//!
//! Optional parts always appear in this fixed order.  The record is built as
//! bytes rather than a `String` because the plain part is the chunk itself,
//! written without any UTF-8 validation.

use chrono::{DateTime, FixedOffset};

use crate::format::flags::LogFormat;
use crate::format::hexdump::hex_dump;
use crate::session::SessionId;

/// `strftime` pattern for the header timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f %:z";

/// Which way a chunk travelled through the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Read from the accepted client, written to the remote.
    LocalToRemote,
    /// Read from the remote, written back to the client.
    RemoteToLocal,
}

impl Direction {
    /// Header marker for this direction.
    pub fn marker(&self) -> &'static str {
        match self {
            Direction::LocalToRemote => "LOCAL>>>>>>>>>>",
            Direction::RemoteToLocal => "REMOTE<<<<<<<<<<",
        }
    }
}

/// Renders one forwarded chunk as a log record.
///
/// With an empty `format` the record is the header followed by a blank line.
///
/// # Examples
///
/// ```rust
/// use chrono::{FixedOffset, TimeZone};
/// use relay_core::{format_record, Direction, LogFormat, SessionId};
///
/// let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let record = format_record(SessionId(1), &ts, Direction::LocalToRemote, b"AB", LogFormat::default());
/// assert!(record.ends_with(b"\nAB\n\n"));
/// ```
pub fn format_record(
    session: SessionId,
    timestamp: &DateTime<FixedOffset>,
    direction: Direction,
    chunk: &[u8],
    format: LogFormat,
) -> Vec<u8> {
    let header = format!(
        "id: {session},{},{}",
        timestamp.format(TIMESTAMP_FORMAT),
        direction.marker()
    );

    let mut out = Vec::with_capacity(header.len() + estimated_body_len(chunk.len(), format) + 2);
    out.extend_from_slice(header.as_bytes());

    if format.fhex_enabled() {
        out.push(b'\n');
        out.extend_from_slice(hex_dump(chunk).as_bytes());
    }
    if format.hex_enabled() {
        out.push(b'\n');
        out.extend_from_slice(hex::encode(chunk).as_bytes());
    }
    if format.plain_enabled() {
        out.push(b'\n');
        out.extend_from_slice(chunk);
    }

    // Trailing empty part: terminates the last line and leaves a blank one.
    out.extend_from_slice(b"\n\n");
    out
}

/// Renders an error line for the console and log file.
pub fn error_line(message: &str) -> Vec<u8> {
    format!("ERROR: {message}\n").into_bytes()
}

fn estimated_body_len(len: usize, format: LogFormat) -> usize {
    let mut total = 0;
    if format.fhex_enabled() {
        total += len.div_ceil(16) * 79 + 1;
    }
    if format.hex_enabled() {
        total += len * 2 + 1;
    }
    if format.plain_enabled() {
        total += len + 1;
    }
    total
}
