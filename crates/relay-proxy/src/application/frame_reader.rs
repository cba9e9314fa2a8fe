//! Turns the read side of a connection into a sequence of [`Frame`]s.
//!
//! A [`FrameReader`] owns a producer task that loops on `read()` and hands
//! each result to the pipe over a single-slot channel.  Running the read in
//! its own task lets the pipe wait on *both* connections at once with
//! `tokio::select!`, whichever has data first.
//!
//! # Frame rules
//!
//! - One successful read of `n > 0` bytes becomes exactly one
//!   [`Frame::Chunk`] of those `n` bytes.  Nothing is merged or split.
//! - A read of 0 bytes (EOF) or a read error becomes one [`Frame::End`] and
//!   the producer stops.  Errors are never retried.
//! - The channel holds at most one frame, so the producer is never more than
//!   one chunk ahead of the pipe.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use relay_core::{Chunk, Frame, StreamEnd, BUFFER_CAPACITY};

/// Consumer handle for one connection's frames.
///
/// Dropping the handle cancels the producer task; [`close`](Self::close)
/// does the same and also waits until the read half has been released.
pub struct FrameReader {
    rx: mpsc::Receiver<Frame>,
    task: JoinHandle<()>,
}

impl FrameReader {
    /// Starts a producer task reading from `reader`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(read_frames(reader, tx));
        Self { rx, task }
    }

    /// Waits for the next frame.
    ///
    /// After the end frame has been returned, further calls keep returning
    /// `Frame::End(StreamEnd::Eof)`.  Cancel-safe, so it can be used as a
    /// `tokio::select!` branch.
    pub async fn next(&mut self) -> Frame {
        // A closed channel without an end frame means the producer is gone
        // (cancelled or panicked); either way no more data will arrive.
        self.rx.recv().await.unwrap_or(Frame::End(StreamEnd::Eof))
    }

    /// Cancels the producer and waits for it to drop the reader.
    pub async fn close(mut self) {
        self.task.abort();
        // Resolves with `Err(JoinError::Cancelled)` or the task's own result;
        // both mean the reader has been dropped.
        let _ = (&mut self.task).await;
    }
}

impl Drop for FrameReader {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Producer loop: one frame per read, then one end frame.
async fn read_frames<R>(mut reader: R, tx: mpsc::Sender<Frame>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; BUFFER_CAPACITY];

    loop {
        let frame = match reader.read(&mut buf).await {
            Ok(n) => match Chunk::copy_from(&buf[..n]) {
                Some(chunk) => Frame::Chunk(chunk),
                None => Frame::End(StreamEnd::Eof),
            },
            Err(e) => Frame::End(StreamEnd::ReadError(e.to_string())),
        };

        let is_end = frame.is_end();
        if tx.send(frame).await.is_err() {
            trace!("frame consumer gone; stopping reader");
            return;
        }
        if is_end {
            return;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokio::io::AsyncWriteExt;
    use tokio_test::io::Builder;

    fn chunk(bytes: &[u8]) -> Frame {
        Frame::Chunk(Chunk::copy_from(bytes).unwrap())
    }

    #[tokio::test]
    async fn test_each_read_becomes_one_chunk() {
        // Arrange: two separate reads, then EOF
        let mock = Builder::new().read(b"hello").read(b"world").build();

        // Act
        let mut reader = FrameReader::spawn(mock);

        // Assert: no merging of the two reads
        assert_eq!(reader.next().await, chunk(b"hello"));
        assert_eq!(reader.next().await, chunk(b"world"));
        assert_eq!(reader.next().await, Frame::End(StreamEnd::Eof));
    }

    #[tokio::test]
    async fn test_read_error_ends_stream_without_retry() {
        // Arrange
        let mock = Builder::new()
            .read(b"abc")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            .build();

        // Act
        let mut reader = FrameReader::spawn(mock);

        // Assert
        assert_eq!(reader.next().await, chunk(b"abc"));
        assert_eq!(
            reader.next().await,
            Frame::End(StreamEnd::ReadError("reset by peer".into()))
        );
    }

    #[tokio::test]
    async fn test_end_is_sticky_after_stream_finishes() {
        let mock = Builder::new().build();
        let mut reader = FrameReader::spawn(mock);
        assert!(reader.next().await.is_end());
        assert!(reader.next().await.is_end());
    }

    #[tokio::test]
    async fn test_large_read_is_capped_at_buffer_capacity() {
        // Arrange: a single read larger than one buffer
        let data = vec![0x5au8; BUFFER_CAPACITY + 10];
        let mock = Builder::new().read(&data).build();

        // Act
        let mut reader = FrameReader::spawn(mock);

        // Assert: the first chunk is a full buffer, the remainder follows
        match reader.next().await {
            Frame::Chunk(c) => assert_eq!(c.len(), BUFFER_CAPACITY),
            other => panic!("expected chunk, got {other:?}"),
        }
        match reader.next().await {
            Frame::Chunk(c) => assert_eq!(c.len(), 10),
            other => panic!("expected chunk, got {other:?}"),
        }
        assert!(reader.next().await.is_end());
    }

    #[tokio::test]
    async fn test_close_releases_the_connection() {
        // Arrange
        let (ours, mut peer) = tokio::io::duplex(64);
        let reader = FrameReader::spawn(ours);

        // Act
        reader.close().await;

        // Assert: our end has been dropped, so the peer can no longer write
        assert!(peer.write_all(b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_peer_eof_yields_end_frame() {
        let (ours, mut peer) = tokio::io::duplex(64);
        let mut reader = FrameReader::spawn(ours);

        peer.write_all(b"bye").await.unwrap();
        drop(peer);

        assert_eq!(reader.next().await, chunk(b"bye"));
        assert_eq!(reader.next().await, Frame::End(StreamEnd::Eof));
    }
}
