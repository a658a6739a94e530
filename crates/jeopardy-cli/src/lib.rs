//! Jeopardy CLI library.
//!
//! Command-line front end for creating and editing `.jpdy` board files.
//! Every editing command opens the file in a
//! [`GameSession`](jeopardy_core::GameSession), applies one change,
//! notifies observers, and saves the board back atomically.

pub mod cli;
pub mod commands;
