//! Error types for jira-log operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for request log operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The log file could not be opened.
    #[error("Cannot open request log {path}: {source}")]
    Open {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// IO error occurred while writing an entry.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized Result type for request log operations.
pub type Result<T> = std::result::Result<T, Error>;
