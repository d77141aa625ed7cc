//! Error types for branch sweeping
//!
//! Configuration errors abort a sweep before any repository is touched.
//! Everything else is recorded per repository or per branch and collected
//! into an [`ErrorSet`](crate::ErrorSet) alongside the partial result.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sweeper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sweeper operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by libgit2
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Staleness threshold below zero
    #[error("Stale days can't be negative (got {0})")]
    InvalidThreshold(i64),

    /// Include or exclude pattern that does not compile
    #[error("Invalid branch pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The scan root cannot be walked at all
    #[error("Failed to scan repositories on path {}: {cause}", path.display())]
    RootUnreadable { path: PathBuf, cause: String },

    /// A subtree below the root could not be read
    #[error("Failed to read {}: {cause}", path.display())]
    Walk { path: PathBuf, cause: String },

    /// A discovered repository could not be opened
    #[error("Could not open repository on path {}: {cause}", path.display())]
    OpenFailed { path: PathBuf, cause: String },

    #[error("{repository} failed to get list of branches: {cause}")]
    BranchEnumerationFailed { repository: String, cause: String },

    #[error("{repository} base branch {branch:?} not found")]
    BaseBranchNotFound { repository: String, branch: String },

    #[error("{repository} failed to read history of branch {branch}: {cause}")]
    HistoryUnavailable {
        repository: String,
        branch: String,
        cause: String,
    },

    #[error("{repository} failed to delete branch {branch}: {cause}")]
    LocalDeleteFailed {
        repository: String,
        branch: String,
        cause: String,
    },

    #[error("{repository} failed to delete remote branch {branch}: {cause}")]
    RemoteDeleteFailed {
        repository: String,
        branch: String,
        cause: String,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts a whole sweep instead of being collected
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::Toml(_)
                | Error::InvalidThreshold(_)
                | Error::InvalidPattern { .. }
                | Error::RootUnreadable { .. }
        )
    }
}
