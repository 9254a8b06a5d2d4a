//! Error types for dir-sizer
//!
//! This module defines the error hierarchy:
//! - Collaborator errors raised while listing or stat-ing a tree
//! - Aggregator errors returned by a sizing run
//! - Configuration and CLI errors
//!
//! Collaborator and aggregator errors are `Clone + PartialEq` so the
//! first recorded error can be stored once and compared in tests.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a `Directory` or `File` implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Path not found
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Directory could not be enumerated
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: PathBuf, reason: String },

    /// Entry size could not be read
    #[error("Failed to stat '{path}': {reason}")]
    StatFailed { path: PathBuf, reason: String },

    /// Any other I/O fault
    #[error("I/O error on '{path}': {reason}")]
    Io { path: PathBuf, reason: String },

    /// The operation observed cancellation before it could finish
    #[error("Cancelled while reading '{path}'")]
    Cancelled { path: PathBuf },
}

impl FsError {
    /// Map an `std::io::Error` for `path` onto the collaborator taxonomy
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound { path },
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path },
            _ => FsError::Io {
                path,
                reason: err.to_string(),
            },
        }
    }

    /// Path the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            FsError::NotFound { path }
            | FsError::PermissionDenied { path }
            | FsError::ReadDirFailed { path, .. }
            | FsError::StatFailed { path, .. }
            | FsError::Io { path, .. }
            | FsError::Cancelled { path } => path,
        }
    }
}

/// Errors returned by a sizing run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    /// A directory listing failed
    #[error("Failed to list directory '{path}': {source}")]
    List { path: PathBuf, source: FsError },

    /// A file stat failed
    #[error("Failed to stat file '{path}': {source}")]
    Stat { path: PathBuf, source: FsError },

    /// The caller cancelled the run
    #[error("Sizing cancelled")]
    Cancelled,

    /// The configured deadline expired
    #[error("Sizing timed out after {after:?}")]
    TimedOut { after: Duration },
}

impl SizeError {
    /// True when the run gave up rather than hitting a broken tree
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SizeError::Cancelled | SizeError::TimedOut { .. })
    }

    /// True for listing failures
    pub fn is_list(&self) -> bool {
        matches!(self, SizeError::List { .. })
    }

    /// True for stat failures
    pub fn is_stat(&self) -> bool {
        matches!(self, SizeError::Stat { .. })
    }

    /// Path of the failing entry, if the error came from the tree
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SizeError::List { path, .. } | SizeError::Stat { path, .. } => Some(path),
            SizeError::Cancelled | SizeError::TimedOut { .. } => None,
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid timeout
    #[error("Invalid timeout {secs}s: must be greater than zero")]
    InvalidTimeout { secs: u64 },

    /// Root path error
    #[error("Invalid root path '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}

/// Result type alias for SizeError
pub type SizeResult<T> = std::result::Result<T, SizeError>;

/// Result type alias for FsError
pub type FsResult<T> = std::result::Result<T, FsError>;
