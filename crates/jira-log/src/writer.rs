//! Append-only request log writer.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use crate::entry::LogEntry;
use crate::error::{Error, Result};

/// Default maximum number of body characters written per entry.
pub const DEFAULT_BODY_LIMIT: usize = 4096;

/// Handle to the request log.
///
/// Cloning is cheap; all clones append to the same file. A handle created
/// with [`RequestLog::disabled`] accepts entries and drops them, which lets
/// callers log unconditionally.
///
/// Writes go through an async mutex and are flushed per entry, so entries
/// from concurrent requests never interleave and survive an abrupt exit.
#[derive(Clone)]
pub struct RequestLog {
    sink: Option<Arc<Sink>>,
    ids: Arc<AtomicU64>,
}

struct Sink {
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
    body_limit: usize,
}

impl RequestLog {
    /// Open (or create) the log file at `path` in append mode.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the directory or file cannot be created.
    pub async fn open(path: impl AsRef<Path>, body_limit: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), body_limit, "Opened request log");

        Ok(Self {
            sink: Some(Arc::new(Sink {
                path,
                file: Mutex::new(BufWriter::new(file)),
                body_limit,
            })),
            ids: Arc::new(AtomicU64::new(1)),
        })
    }

    /// A log that discards every entry.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sink: None,
            ids: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Whether entries are written anywhere.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Path of the log file, if enabled.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.sink.as_deref().map(|sink| sink.path.as_path())
    }

    /// Allocate the next request id.
    ///
    /// Ids start at 1 and are unique per handle family (clones share them).
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    /// Append an entry, reporting failures through `tracing` only.
    ///
    /// A broken log file must never fail the API call being logged.
    pub async fn record(&self, entry: &LogEntry) {
        if let Err(e) = self.try_record(entry).await {
            tracing::warn!(error = %e, kind = entry.kind(), id = entry.id(), "Failed to write request log entry");
        }
    }

    /// Append an entry and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing or flushing fails.
    pub async fn try_record(&self, entry: &LogEntry) -> Result<()> {
        let Some(sink) = self.sink.as_deref() else {
            return Ok(());
        };

        let line = entry.format_line(Utc::now(), sink.body_limit);
        let mut file = sink.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl std::fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLog")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::disabled()
    }
}
