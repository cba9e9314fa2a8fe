//! Production [`RecordSink`]: standard output plus an optional log file.
//!
//! Records always go to stdout.  If a log file path was configured, the file
//! is opened once, at startup, in append mode (created if missing), and every
//! record is mirrored into it.  The sink never rotates or reopens the file.
//!
//! Everything here is best-effort: a file that cannot be opened disables the
//! mirror with a warning, and failed writes are only reported at debug level.
//! The relay keeps forwarding either way.
//!
//! Writes use blocking `std::io`.  Each record is one short `write_all` into
//! the OS buffer, and holding the stdout lock (or the file mutex) for the
//! whole record keeps records from concurrent sessions from interleaving.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use relay_core::error_line;

use crate::application::sink::RecordSink;

/// Console sink with an optional append-only mirror file.
#[derive(Debug)]
pub struct ConsoleSink {
    log_file: Option<LogFile>,
}

#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl ConsoleSink {
    /// Creates a sink that writes to stdout only.
    pub fn console_only() -> Self {
        Self { log_file: None }
    }

    /// Creates a sink that writes to stdout and, if `log_file` is `Some`,
    /// appends to that file too.
    ///
    /// Failure to open the file is not an error: the sink falls back to
    /// stdout only and logs a warning.
    pub fn open(log_file: Option<&Path>) -> Self {
        let Some(path) = log_file else {
            return Self::console_only();
        };

        match open_append(path) {
            Ok(file) => {
                info!("mirroring records to {}", path.display());
                Self {
                    log_file: Some(LogFile {
                        path: path.to_path_buf(),
                        file: Mutex::new(file),
                    }),
                }
            }
            Err(e) => {
                warn!("cannot open log file {}: {e}; logging to stdout only", path.display());
                Self::console_only()
            }
        }
    }

    /// Path of the mirror file, if one is open.
    pub fn log_file_path(&self) -> Option<&Path> {
        self.log_file.as_ref().map(|f| f.path.as_path())
    }

    fn write_to_file(&self, bytes: &[u8]) {
        if let Some(log_file) = &self.log_file {
            let mut file = log_file.file.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = file.write_all(bytes) {
                debug!("write to {} failed: {e}", log_file.path.display());
            }
        }
    }
}

impl RecordSink for ConsoleSink {
    fn emit(&self, record: &[u8]) {
        {
            let mut out = io::stdout().lock();
            let _ = out.write_all(record);
            let _ = out.flush();
        }
        self.write_to_file(record);
    }

    fn emit_error(&self, message: &str) {
        let line = error_line(message);
        {
            let mut err = io::stderr().lock();
            let _ = err.write_all(&line);
        }
        self.write_to_file(&line);
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
