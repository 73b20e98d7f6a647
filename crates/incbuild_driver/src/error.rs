//! Errors that abort a build run.

use std::path::PathBuf;

use incbuild_cache::CacheError;

use crate::toolchain::ToolError;

/// A fatal build error. Any of these aborts the run before the record file
/// is written, so the next run retries the same work.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler failed on a source file.
    #[error("compilation of {file} failed: {source}")]
    Compile {
        /// File name of the source.
        file: String,
        /// The tool failure.
        source: ToolError,
    },

    /// The compiler reported success but left no object behind.
    #[error("compiler produced no object at {0}")]
    ObjectNotProduced(PathBuf),

    /// The archiver failed.
    #[error("{context}: {source}")]
    Archive {
        /// What was being attempted.
        context: String,
        /// The tool failure.
        source: ToolError,
    },

    /// The archive name is unusable.
    #[error("invalid archive name '{0}'")]
    InvalidArchiveName(String),

    /// The record file could not be saved.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl BuildError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_display_names_file() {
        let err = BuildError::Compile {
            file: "a.cpp".to_string(),
            source: ToolError::Failed {
                program: "g++".to_string(),
                code: Some(1),
            },
        };
        assert_eq!(
            err.to_string(),
            "compilation of a.cpp failed: g++ exited with code 1"
        );
    }

    #[test]
    fn archive_display_has_context() {
        let err = BuildError::Archive {
            context: "failed to add a.o to library".to_string(),
            source: ToolError::Failed {
                program: "ar".to_string(),
                code: Some(2),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to add a.o to library: ar exited with code 2"
        );
    }

    #[test]
    fn io_helper_keeps_path() {
        let err = BuildError::io(
            "src",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        );
        assert!(err.to_string().starts_with("I/O error at src:"));
    }
}
