//! A single prompt/answer clue on the board.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::QuestionId;

/// A clue worth some number of points.
///
/// Points can only change through the owning [`Category`](crate::Category)
/// so that the category stays sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identity, used for removal and lookup.
    #[serde(default)]
    id: QuestionId,

    /// Text shown to the players.
    prompt: String,

    /// Expected response.
    answer: String,

    /// Point value; may be negative.
    points: i64,

    /// Set once the clue has been played.
    #[serde(default)]
    answered: bool,
}

impl Question {
    /// Creates an unanswered question.
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>, points: i64) -> Self {
        Self {
            id: QuestionId::new(),
            prompt: prompt.into(),
            answer: answer.into(),
            points,
            answered: false,
        }
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    /// Marks the question as played. There is no way back.
    pub fn set_answered(&mut self) {
        self.answered = true;
    }

    pub(crate) fn set_points(&mut self, points: i64) {
        self.points = points;
    }
}

/// Parses a point value typed by a user.
///
/// Surrounding whitespace is ignored; anything else that is not a whole
/// number is rejected.
pub fn parse_points(input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|e| ModelError::InvalidPoints {
            input: input.to_string(),
            reason: e.to_string(),
        })
}
