//! Destinations for log records.
//!
//! The pipe hands every formatted record to a [`RecordSink`].  The production
//! sink (console plus optional log file) lives in the infrastructure layer;
//! [`MemorySink`] captures records in memory so tests can inspect exactly
//! what a session logged.
//!
//! Sinks are best-effort by contract: `emit` never returns an error and must
//! never stop the relay.

use std::sync::{Mutex, PoisonError};

/// Receives formatted records from every session.
///
/// Implementations are shared by all sessions behind an `Arc`, so they must
/// be `Send + Sync` and must keep each record contiguous in their output.
#[cfg_attr(test, mockall::automock)]
pub trait RecordSink: Send + Sync {
    /// Writes one complete record.
    fn emit(&self, record: &[u8]);

    /// Writes one error message (e.g. a failed dial).
    fn emit_error(&self, message: &str);
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Vec<u8>>>,
    errors: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record emitted so far, in emission order.
    pub fn records(&self) -> Vec<Vec<u8>> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of every error message emitted so far.
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &[u8]) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.to_vec());
    }

    fn emit_error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
