//! Contestants and their running scores.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::PlayerId;

/// A named scorekeeping entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    id: PlayerId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: i64,
}

impl Player {
    /// Creates a player with the given name and a zero score.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Adjusts the score; negative deltas deduct. Saturates at the `i64`
    /// bounds.
    pub fn incr_score(&mut self, delta: i64) {
        self.score = self.score.saturating_add(delta);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.score)
    }
}

/// Zero-value queries on a player that may be absent.
pub trait OptionalPlayer {
    /// Empty string when absent.
    fn name(self) -> String;
    /// 0 when absent.
    fn score(self) -> i64;
    /// `"Null Player"` when absent, otherwise `"<name>: <score>"`.
    fn as_string(self) -> String;
}

impl OptionalPlayer for Option<&Player> {
    fn name(self) -> String {
        self.map(|p| p.name.clone()).unwrap_or_default()
    }

    fn score(self) -> i64 {
        self.map_or(0, Player::score)
    }

    fn as_string(self) -> String {
        match self {
            Some(player) => player.to_string(),
            None => "Null Player".to_string(),
        }
    }
}

/// No-op mutators on a player that may be absent.
pub trait OptionalPlayerMut {
    fn set_name(self, name: impl Into<String>);
    fn reset_score(self);
    fn incr_score(self, delta: i64);
}

impl OptionalPlayerMut for Option<&mut Player> {
    fn set_name(self, name: impl Into<String>) {
        if let Some(player) = self {
            player.set_name(name);
        }
    }

    fn reset_score(self) {
        if let Some(player) = self {
            player.reset_score();
        }
    }

    fn incr_score(self, delta: i64) {
        if let Some(player) = self {
            player.incr_score(delta);
        }
    }
}
