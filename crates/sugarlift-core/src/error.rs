//! Error types for sugarlift-core.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A type name could not be parsed.
    #[error("invalid type name: {0:?}")]
    InvalidTypeName(String),

    /// Generic argument brackets do not balance.
    #[error("unbalanced generic arguments in {0:?}")]
    UnbalancedTypeArguments(String),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
