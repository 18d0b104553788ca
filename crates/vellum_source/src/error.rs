//! Error types for resource lookup and watching.

use std::path::PathBuf;

/// Errors raised by file providers.
///
/// A missing resource is not an error: lookups report it through
/// [`FileInfo::exists`](crate::FileInfo::exists). These variants cover reading a
/// resource that was reported present, and setting up filesystem watching.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// An I/O error occurred while reading a resource.
    #[error("source I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Content was requested from a resource that does not exist.
    #[error("resource '{key}' does not exist")]
    Missing {
        /// The key that was looked up.
        key: String,
    },

    /// The filesystem watcher could not be started.
    #[error("failed to watch {root}: {reason}")]
    Watch {
        /// The directory being watched.
        root: PathBuf,
        /// Description of the watcher failure.
        reason: String,
    },
}
