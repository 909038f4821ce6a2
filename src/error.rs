//! Error taxonomy for tracked directories.
//!
//! Store, codec and engine failures are reported as [`TrackError`] so callers
//! can tell an untracked directory apart from a damaged one. Command modules
//! wrap them in `anyhow` with context and recover the kind through
//! `downcast_ref` when they need it.

use std::path::PathBuf;

/// Failures raised while reading or writing a tracked directory.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The metadata subdirectory is absent.
    #[error("{} is not a tracked directory (no {} found)", .path.display(), crate::META_DIR)]
    NotTracked {
        /// Directory that was expected to be tracked
        path: PathBuf,
    },

    /// The metadata subdirectory is present but already marks the directory as tracked.
    #[error("{} is already initialized", .path.display())]
    AlreadyInitialized {
        /// Directory that is already tracked
        path: PathBuf,
    },

    /// An identity or version marker file is missing.
    #[error("No {marker} marker found in {}", .path.display())]
    MissingMarker {
        /// Which marker was looked for ("identity" or "version")
        marker: &'static str,
        /// Tracked directory root
        path: PathBuf,
    },

    /// Manifest text or a marker name could not be parsed.
    #[error("Invalid format in {} (line {line}): {reason}", .path.display())]
    Format {
        /// File (or directory, for markers) holding the bad data
        path: PathBuf,
        /// 1-based line number, 0 when not line oriented
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// The identity supplied at initialization cannot be used as a marker name.
    #[error("Invalid identity '{identity}': {reason}")]
    InvalidIdentity {
        /// Rejected identity
        identity: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Filesystem read, write, walk or move failure.
    #[error("I/O error during {context}")]
    Io {
        /// Operation that failed, including the path involved
        context: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for store, codec and engine operations.
pub type TrackResult<T> = std::result::Result<T, TrackError>;

impl TrackError {
    /// Builds a closure mapping an `io::Error` into [`TrackError::Io`] with context.
    pub fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }

    /// Shorthand for a format error at a given line.
    pub fn format(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
