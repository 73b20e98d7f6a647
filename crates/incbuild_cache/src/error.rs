//! Error types for record file operations.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the record file.
///
/// Loading is fail-safe: [`BuildCache::load`](crate::BuildCache::load) turns
/// every error into an empty cache. Saving propagates errors to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing the record file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A line of the record file could not be parsed.
    #[error("malformed record on line {line}: {reason}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// Description of the parse failure.
        reason: String,
    },

    /// The temporary file could not be moved over the record file.
    #[error("failed to replace record file {path}: {source}")]
    Persist {
        /// The record file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
