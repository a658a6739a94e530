//! Error types for board model operations.

use thiserror::Error;

/// Errors raised when a caller hands the model invalid input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A positional index fell outside the sequence.
    #[error("index {index} out of range for {len} categories")]
    IndexOutOfRange { index: usize, len: usize },

    /// Point values must be whole numbers.
    #[error("invalid point value {input:?}: {reason}")]
    InvalidPoints { input: String, reason: String },

    /// No element with the given ID exists.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
