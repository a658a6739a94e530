//! Error types for session operations.

use std::fmt;

use jeopardy_persistence::PersistenceError;
use thiserror::Error;

use crate::session::ObserverId;

/// One observer that failed during a notification round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub observer: ObserverId,
    pub message: String,
}

impl fmt::Display for ObserverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.observer, self.message)
    }
}

/// Errors that can occur during session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The operation needs a board but none is open.
    #[error("no board is open")]
    NoBoard,

    /// Persistence error.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// One or more observers failed; every observer was still called.
    #[error("{} observer(s) failed: {}", .0.len(), join_failures(.0))]
    ObserversFailed(Vec<ObserverFailure>),
}

fn join_failures(failures: &[ObserverFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
