//! A named column of questions, kept sorted by points.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{CategoryId, QuestionId};
use crate::question::Question;

/// A named, points-sorted collection of questions.
///
/// Questions are always in non-decreasing point order. Sorting is stable,
/// so questions with equal points keep the order they were added in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    id: CategoryId,

    /// Display name, shown as the column header.
    pub name: String,

    #[serde(default)]
    questions: Vec<Question>,
}

impl Category {
    /// Creates an empty category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            questions: Vec::new(),
        }
    }

    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    /// Questions in ascending point order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends questions and re-sorts the column by points.
    pub fn add_questions(&mut self, questions: impl IntoIterator<Item = Question>) {
        self.questions.extend(questions);
        self.sort();
    }

    /// Removes every question carrying the given ID.
    ///
    /// Returns what was removed, empty if nothing matched. Survivors keep
    /// their order.
    pub fn remove_question(&mut self, id: &QuestionId) -> Vec<Question> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.questions)
            .into_iter()
            .partition(|q| q.id() == id);
        self.questions = kept;
        removed
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    /// Mutable access for editing prompt, answer, or answered state.
    pub fn question_mut(&mut self, id: &QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id() == id)
    }

    /// Changes a question's points and moves it to its sorted position.
    pub fn set_question_points(&mut self, id: &QuestionId, points: i64) -> Result<()> {
        let question = self
            .question_mut(id)
            .ok_or_else(|| ModelError::NotFound {
                kind: "question",
                id: id.to_string(),
            })?;
        question.set_points(points);
        self.sort();
        Ok(())
    }

    /// Rows this column occupies: one header plus one per question.
    pub fn height(&self) -> usize {
        1 + self.questions.len()
    }

    /// Highest point value in the column, or 0 when empty.
    pub fn max_points(&self) -> i64 {
        self.questions.iter().map(Question::points).max().unwrap_or(0)
    }

    fn sort(&mut self) {
        self.questions.sort_by_key(Question::points);
    }
}

/// Zero-value queries on a category that may be absent.
pub trait OptionalCategory {
    /// 0 when absent.
    fn height(self) -> usize;
    /// 0 when absent or empty.
    fn max_points(self) -> i64;
}

impl OptionalCategory for Option<&Category> {
    fn height(self) -> usize {
        self.map_or(0, Category::height)
    }

    fn max_points(self) -> i64 {
        self.map_or(0, Category::max_points)
    }
}

/// No-op mutators on a category that may be absent.
pub trait OptionalCategoryMut {
    fn add_questions(self, questions: impl IntoIterator<Item = Question>);
    fn remove_question(self, id: &QuestionId) -> Vec<Question>;
}

impl OptionalCategoryMut for Option<&mut Category> {
    fn add_questions(self, questions: impl IntoIterator<Item = Question>) {
        if let Some(category) = self {
            category.add_questions(questions);
        }
    }

    fn remove_question(self, id: &QuestionId) -> Vec<Question> {
        self.map_or_else(Vec::new, |category| category.remove_question(id))
    }
}
