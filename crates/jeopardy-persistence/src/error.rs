//! Error types for persistence operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read from or write to a stream.
    #[error("stream I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a value as JSON.
    #[error("failed to serialize: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stream did not contain a valid document of the expected shape.
    #[error("failed to deserialize: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A thread panicked while holding the persistence lock.
    #[error("persistence lock poisoned")]
    LockPoisoned,
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
