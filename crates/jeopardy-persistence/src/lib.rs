//! Persistence layer for Jeopardy boards.
//!
//! The [`PersistenceGateway`] serializes any serde value to tab-indented
//! JSON on an already-open stream, and reads it back. All clones of a
//! gateway share one lock, so at most one save or load runs at a time.
//!
//! Path-based helpers in [`atomic`] add the `.jpdy` extension and replace
//! files atomically (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use jeopardy_persistence::PersistenceGateway;
//! use jeopardy_models::Board;
//!
//! let gateway = PersistenceGateway::new();
//! let board = Board::new("Friday Night");
//!
//! let path = gateway.save_to_path("friday", &board).unwrap();
//! let loaded: Board = gateway.load_from_path(&path).unwrap();
//! ```

pub mod atomic;
pub mod error;
pub mod gateway;

pub use atomic::{with_board_extension, BOARD_EXTENSION};
pub use error::{PersistenceError, Result};
pub use gateway::PersistenceGateway;
