//! Error types for sugarlift-transforms.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing a transform run.
///
/// Rewrites themselves never fail: a rule whose preconditions do not hold
/// leaves the tree untouched.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Settings file could not be read.
    #[error("failed to read settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for [`TransformSettings`](crate::TransformSettings).
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A rewrite rule name was not recognized.
    #[error("unknown rewrite rule: {0}")]
    UnknownRule(String),

    /// A language version name was not recognized.
    #[error("unknown language version: {0}")]
    UnknownLanguageVersion(String),
}

/// Result alias for transform setup operations.
pub type TransformResult<T> = Result<T, TransformError>;
