//! Identities for board elements.
//!
//! Two questions with the same prompt, answer, and points are still
//! different clues, so lookup and removal go by ID. An ID is a
//! `<prefix>-<uuid>` string and is stored as a plain string in board files.
//! Elements loaded from a file without an ID get a fresh one.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn fresh(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix of generated IDs.
            pub const PREFIX: &'static str = $prefix;

            /// A new, unique ID.
            pub fn new() -> Self {
                Self(fresh(Self::PREFIX))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

element_id!(
    /// Identity of a [`Question`](crate::Question).
    QuestionId => "q"
);
element_id!(
    /// Identity of a [`Category`](crate::Category).
    CategoryId => "cat"
);
element_id!(
    /// Identity of a [`Player`](crate::Player).
    PlayerId => "player"
);
