//! Request/response diagnostics.
//!
//! The transport reports every exchange to a [`DiagnosticSink`]. The default
//! [`NoopSink`] discards everything. [`FileSink`] appends one JSON object per
//! line to a local file. Its own I/O failures are logged and never reach the
//! request path.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// One observable event on the request path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticRecord {
    Request {
        method: String,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        variables: Option<Value>,
    },
    Response {
        status: u16,
        duration_ms: u64,
        bytes: usize,
    },
    Error {
        message: String,
        duration_ms: u64,
    },
}

/// Receives diagnostic records. Implementations must not block for long
/// and must never fail.
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    fn record(&self, record: &DiagnosticRecord);
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _record: &DiagnosticRecord) {}
}

#[derive(Serialize)]
struct Line<'a> {
    timestamp: String,
    #[serde(flatten)]
    record: &'a DiagnosticRecord,
}

/// Appends JSON lines to a file.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directory.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

impl DiagnosticSink for FileSink {
    fn record(&self, record: &DiagnosticRecord) {
        let line = Line {
            timestamp: chrono::Utc::now().to_rfc3339(),
            record,
        };
        let mut encoded = match serde_json::to_string(&line) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Could not encode diagnostic record");
                return;
            }
        };
        encoded.push('\n');
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = file.write_all(encoded.as_bytes()) {
            warn!(path = %self.path.display(), error = %e, "Could not write diagnostic record");
        }
    }
}
