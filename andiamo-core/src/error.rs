//! Error types for andiamo.

use thiserror::Error;

/// Errors that can occur in andiamo operations.
#[derive(Error, Debug)]
pub enum AndiamoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Malformed date '{value}' on event {id}")]
    MalformedDate { id: i64, value: String },

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for andiamo operations.
pub type AndiamoResult<T> = Result<T, AndiamoError>;
