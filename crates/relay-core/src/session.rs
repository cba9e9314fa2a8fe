//! Session identity.
//!
//! Every accepted connection gets a [`SessionId`] from a [`SessionCounter`]
//! owned by the relay server.  The id tags each log record so interleaved
//! output from concurrent sessions can be told apart.
//!
//! # Thread safety
//!
//! The counter uses `AtomicU64::fetch_add`, a single indivisible
//! read-modify-write, so two sessions accepted at the same moment can never
//! receive the same id.  Ids reflect the order in which `next()` was called,
//! which is accept order as long as one task does the accepting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of one relayed connection pair.
///
/// Displays zero-padded to nine digits (`000000042`), the width used in log
/// record headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

/// A thread-safe, monotonically increasing source of [`SessionId`]s.
///
/// The first id handed out is 1.
///
/// # Examples
///
/// ```rust
/// use relay_core::SessionCounter;
///
/// let counter = SessionCounter::new();
/// assert_eq!(counter.next().0, 1);
/// assert_eq!(counter.next().0, 2);
/// ```
#[derive(Debug)]
pub struct SessionCounter {
    /// Id that the next call to [`next`](Self::next) returns.
    inner: AtomicU64,
}

impl SessionCounter {
    /// Creates a counter whose first id is 1.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(1),
        }
    }

    /// Returns the next id and atomically advances the counter.
    ///
    /// `Relaxed` is enough: the id is a label, not a synchronisation point.
    /// Wraps from `u64::MAX` to 0 without panicking.
    pub fn next(&self) -> SessionId {
        SessionId(self.inner.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.inner.load(Ordering::Relaxed).wrapping_sub(1)
    }
}

impl Default for SessionCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_id_is_one() {
        // Arrange
        let counter = SessionCounter::new();

        // Act
        let first = counter.next();

        // Assert
        assert_eq!(first, SessionId(1));
    }

    #[test]
    fn test_ids_increase_monotonically() {
        let counter = SessionCounter::new();
        let ids: Vec<SessionId> = (0..50).map(|_| counter.next()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "ids must be strictly increasing");
        }
    }

    #[test]
    fn test_ids_are_unique_across_threads() {
        // Arrange
        let counter = Arc::new(SessionCounter::new());
        let threads = 8;
        let per_thread = 500;

        // Act: allocate ids from many threads at once
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let c = Arc::clone(&counter);
                thread::spawn(move || (0..per_thread).map(|_| c.next().0).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();

        // Assert
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), threads * per_thread);
        assert_eq!(counter.issued(), (threads * per_thread) as u64);
    }

    #[test]
    fn test_counter_wraps_at_u64_max() {
        let counter = SessionCounter {
            inner: AtomicU64::new(u64::MAX),
        };
        assert_eq!(counter.next(), SessionId(u64::MAX));
        assert_eq!(counter.next(), SessionId(0));
    }

    #[test]
    fn test_display_is_nine_digit_zero_padded() {
        assert_eq!(SessionId(1).to_string(), "000000001");
        assert_eq!(SessionId(123_456_789).to_string(), "123456789");
    }

    #[test]
    fn test_display_does_not_truncate_wide_ids() {
        assert_eq!(SessionId(1_234_567_890).to_string(), "1234567890");
    }

    #[test]
    fn test_issued_starts_at_zero() {
        let counter = SessionCounter::default();
        assert_eq!(counter.issued(), 0);
        counter.next();
        assert_eq!(counter.issued(), 1);
    }
}
