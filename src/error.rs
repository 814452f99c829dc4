use thiserror::Error;

/// Unified error type for release-plan operations
#[derive(Error, Debug)]
pub enum ReleasePlanError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("No matching release target: {0}")]
    NoMatchingTarget(String),

    #[error("Unknown release target: {0}")]
    UnknownTarget(String),

    #[error("Dirty workspace: {0}")]
    DirtyWorkspace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-plan
pub type Result<T> = std::result::Result<T, ReleasePlanError>;

impl ReleasePlanError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleasePlanError::Config(msg.into())
    }

    /// Create a malformed-version error with context
    pub fn malformed_version(msg: impl Into<String>) -> Self {
        ReleasePlanError::MalformedVersion(msg.into())
    }

    /// Create a no-matching-target error with context
    pub fn no_matching_target(msg: impl Into<String>) -> Self {
        ReleasePlanError::NoMatchingTarget(msg.into())
    }

    /// Create an unknown-target error with context
    pub fn unknown_target(msg: impl Into<String>) -> Self {
        ReleasePlanError::UnknownTarget(msg.into())
    }

    /// Create a dirty-workspace error with context
    pub fn dirty_workspace(msg: impl Into<String>) -> Self {
        ReleasePlanError::DirtyWorkspace(msg.into())
    }
}
