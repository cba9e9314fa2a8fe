//! Values produced by a connection reader.
//!
//! A reader yields one [`Frame::Chunk`] per successful read call and then
//! exactly one [`Frame::End`], after which it produces nothing.  EOF and
//! read errors both end the stream; [`StreamEnd`] only records which one it
//! was, for diagnostics.

use std::fmt;
use std::ops::Deref;

/// Capacity of the per-read buffer.  A chunk is never larger than this.
pub const BUFFER_CAPACITY: usize = 0xffff;

/// Immutable bytes returned by a single read call (1..=[`BUFFER_CAPACITY`]).
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk(Box<[u8]>);

impl Chunk {
    /// Copies `bytes` into a new chunk.  Returns `None` for an empty slice,
    /// since a zero-length read means end of stream, not data.
    pub fn copy_from(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self(bytes.into()))
        }
    }
}

/// A chunk is read as the byte slice it holds: `&chunk[..]`, `chunk.len()`,
/// or passed wherever `&[u8]` is expected.
impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({} bytes)", self.0.len())
    }
}

/// Why a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The peer closed its side (a read returned 0 bytes).
    Eof,
    /// A read failed.  Treated exactly like EOF; the message is kept for logs.
    ReadError(String),
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEnd::Eof => f.write_str("EOF"),
            StreamEnd::ReadError(msg) => write!(f, "read error: {msg}"),
        }
    }
}

/// One item from a connection reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Chunk(Chunk),
    End(StreamEnd),
}

impl Frame {
    pub fn is_end(&self) -> bool {
        matches!(self, Frame::End(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_read_is_not_a_chunk() {
        assert!(Chunk::copy_from(&[]).is_none());
    }

    #[test]
    fn test_chunk_preserves_bytes_exactly() {
        let chunk = Chunk::copy_from(&[0x00, 0xff, 0x41]).unwrap();
        assert_eq!(&chunk[..], &[0x00, 0xff, 0x41]);
        assert_eq!(chunk.len(), 3);
    }

    #[test]
    fn test_chunk_debug_hides_payload() {
        let chunk = Chunk::copy_from(b"password").unwrap();
        assert_eq!(format!("{chunk:?}"), "Chunk(8 bytes)");
    }

    #[test]
    fn test_is_end() {
        assert!(Frame::End(StreamEnd::Eof).is_end());
        assert!(!Frame::Chunk(Chunk::copy_from(b"a").unwrap()).is_end());
    }

    #[test]
    fn test_stream_end_display() {
        assert_eq!(StreamEnd::Eof.to_string(), "EOF");
        assert_eq!(
            StreamEnd::ReadError("connection reset".into()).to_string(),
            "read error: connection reset"
        );
    }
}
