//! Jeopardy Core - game session state shared by every editor front end.
//!
//! - **session**: the active board, observer fan-out, and a deferred
//!   command queue for changes requested from inside observers
//! - **config**: environment-file loading and user settings

pub mod config;
pub mod error;
pub mod session;

pub use config::{load_env_file, ConfigError, HexColor, Settings};
pub use error::{ObserverFailure, Result, SessionError};
pub use session::{
    BoardChanged, BoardCommand, GameSession, ObserverId, ObserverResult, SessionState,
};
