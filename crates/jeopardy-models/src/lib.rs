//! Core data models for the Jeopardy board editor.
//!
//! A [`Board`] owns an ordered list of [`Category`] values and [`Player`]
//! values; each category owns its [`Question`]s, kept sorted by points.
//! Every element carries a typed ID, and removal matches by that ID rather
//! than by value.
//!
//! The [`OptionalBoard`], [`OptionalCategory`], and [`OptionalPlayer`]
//! traits give `Option<&T>` receivers a zero-value contract: queries on
//! `None` return `0` (or an empty string) and mutators do nothing.

pub mod board;
pub mod category;
pub mod error;
pub mod ids;
pub mod player;
pub mod question;

pub use board::{Board, OptionalBoard, OptionalBoardMut};
pub use category::{Category, OptionalCategory, OptionalCategoryMut};
pub use error::{ModelError, Result};
pub use ids::{CategoryId, PlayerId, QuestionId};
pub use player::{OptionalPlayer, OptionalPlayerMut, Player};
pub use question::{parse_points, Question};
