//! The duplex pipe: forwards chunks between the two connections of one
//! session until either side ends.
//!
//! ```text
//!            ┌──────────── pipe task ─────────────┐
//!  local  ──►│ FrameReader(local)  ─┐             │──► remote
//!  (client)  │                      ├─ select! ───│
//!  local  ◄──│ FrameReader(remote) ─┘   + sink    │◄── remote
//!            └────────────────────────────────────┘
//! ```
//!
//! # Rules
//!
//! - Whichever reader has a frame first is served first.  When both are
//!   ready the order is unspecified; the two directions are independent.
//! - A chunk is formatted and handed to the sink, then written verbatim to
//!   the opposite connection.
//! - A failed write is logged and counted but does not end the session; the
//!   broken connection's reader reports the end shortly after.
//! - The first end frame, from either side, stops the loop.  Both
//!   connections are then shut down and both readers cancelled.
//! - Writes are awaited inline, so a peer that stops reading stalls the
//!   other direction of the same session too.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use relay_core::{format_record, Chunk, Direction, Frame, LogFormat, SessionId, StreamEnd};

use crate::application::frame_reader::FrameReader;
use crate::application::sink::RecordSink;

/// Everything a pipe needs besides its two connections.
#[derive(Clone)]
pub struct PipeContext {
    pub session: SessionId,
    pub format: LogFormat,
    pub sink: Arc<dyn RecordSink>,
}

/// One end of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The accepted client connection.
    Local,
    /// The dialled upstream connection.
    Remote,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Local => f.write_str("local"),
            Side::Remote => f.write_str("remote"),
        }
    }
}

/// Counters for one forwarding direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionStats {
    /// Chunks written successfully.
    pub chunks: u64,
    /// Bytes written successfully.
    pub bytes: u64,
    /// Writes that failed.
    pub write_failures: u64,
}

/// How a pipe ended and what it forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeSummary {
    /// The side whose reader ended the session.
    pub ended_by: Side,
    /// Why that reader ended.
    pub end: StreamEnd,
    pub local_to_remote: DirectionStats,
    pub remote_to_local: DirectionStats,
}

impl PipeSummary {
    /// `true` if the session ended on a clean EOF and every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.end == StreamEnd::Eof
            && self.local_to_remote.write_failures == 0
            && self.remote_to_local.write_failures == 0
    }
}

impl fmt::Display for PipeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ended by {} ({}), local->remote {} bytes, remote->local {} bytes",
            self.ended_by, self.end, self.local_to_remote.bytes, self.remote_to_local.bytes
        )?;
        let failures =
            self.local_to_remote.write_failures + self.remote_to_local.write_failures;
        if failures > 0 {
            write!(f, ", {failures} failed writes")?;
        }
        Ok(())
    }
}

/// Runs the forwarding loop for one session until either side ends.
///
/// Takes ownership of both connections and closes them before returning,
/// whichever side ended the session.
pub async fn pipe<L, R>(local: L, remote: R, ctx: PipeContext) -> PipeSummary
where
    L: AsyncRead + AsyncWrite + Send + 'static,
    R: AsyncRead + AsyncWrite + Send + 'static,
{
    let (local_read, mut local_write) = tokio::io::split(local);
    let (remote_read, mut remote_write) = tokio::io::split(remote);

    let mut local_frames = FrameReader::spawn(local_read);
    let mut remote_frames = FrameReader::spawn(remote_read);

    let mut local_to_remote = DirectionStats::default();
    let mut remote_to_local = DirectionStats::default();

    let (ended_by, end) = loop {
        tokio::select! {
            frame = local_frames.next() => match frame {
                Frame::Chunk(chunk) => {
                    forward(&ctx, Direction::LocalToRemote, &chunk, &mut remote_write, &mut local_to_remote).await;
                }
                Frame::End(end) => break (Side::Local, end),
            },
            frame = remote_frames.next() => match frame {
                Frame::Chunk(chunk) => {
                    forward(&ctx, Direction::RemoteToLocal, &chunk, &mut local_write, &mut remote_to_local).await;
                }
                Frame::End(end) => break (Side::Remote, end),
            },
        }
    };

    debug!(session = %ctx.session, "{ended_by} side ended ({end}); closing both connections");

    // Shut down the write halves so each peer sees EOF, then cancel the
    // readers so the read halves are dropped too.  Errors here only mean the
    // connection was already gone.
    let _ = local_write.shutdown().await;
    let _ = remote_write.shutdown().await;
    local_frames.close().await;
    remote_frames.close().await;

    PipeSummary {
        ended_by,
        end,
        local_to_remote,
        remote_to_local,
    }
}

/// Logs one chunk and writes it to the opposite connection.
async fn forward<W>(
    ctx: &PipeContext,
    direction: Direction,
    chunk: &Chunk,
    writer: &mut W,
    stats: &mut DirectionStats,
) where
    W: AsyncWrite + Unpin,
{
    let record = format_record(
        ctx.session,
        &Local::now().fixed_offset(),
        direction,
        chunk,
        ctx.format,
    );
    ctx.sink.emit(&record);

    match writer.write_all(chunk).await {
        Ok(()) => {
            stats.chunks += 1;
            stats.bytes += chunk.len() as u64;
        }
        Err(e) => {
            stats.write_failures += 1;
            warn!(session = %ctx.session, ?direction, "write of {} bytes failed: {e}", chunk.len());
            ctx.sink.emit_error(&format!(
                "session {} {} write failed: {e}",
                ctx.session,
                direction.marker()
            ));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
