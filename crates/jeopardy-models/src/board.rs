//! A full game: ordered categories plus the players competing on them.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{ModelError, Result};
use crate::ids::{CategoryId, PlayerId};
use crate::player::Player;

/// A named game board.
///
/// Category order is display order and only changes through
/// [`Board::swap_categories`], [`Board::add_categories`], and
/// [`Board::remove_category`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Board title.
    pub name: String,

    #[serde(default)]
    categories: Vec<Category>,

    #[serde(default)]
    players: Vec<Player>,
}

impl Board {
    /// Creates a board with no categories and no players.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
            players: Vec::new(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn add_categories(&mut self, categories: impl IntoIterator<Item = Category>) {
        self.categories.extend(categories);
    }

    pub fn add_players(&mut self, players: impl IntoIterator<Item = Player>) {
        self.players.extend(players);
    }

    /// Exchanges the categories at positions `i` and `j`.
    ///
    /// Fails without touching the board if either index is out of range.
    pub fn swap_categories(&mut self, i: usize, j: usize) -> Result<()> {
        let len = self.categories.len();
        if let Some(&index) = [i, j].iter().find(|&&idx| idx >= len) {
            return Err(ModelError::IndexOutOfRange { index, len });
        }
        self.categories.swap(i, j);
        Ok(())
    }

    /// Removes every category carrying the given ID and returns them.
    pub fn remove_category(&mut self, id: &CategoryId) -> Vec<Category> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.categories)
            .into_iter()
            .partition(|c| c.id() == id);
        self.categories = kept;
        removed
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id() == id)
    }

    pub fn category_mut(&mut self, id: &CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id() == id)
    }

    /// First category with exactly this name.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_by_name_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    /// Whether a category name is already taken.
    pub fn has_category(&self, name: &str) -> bool {
        self.category_by_name(name).is_some()
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn player_by_name_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name() == name)
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Vec<Player> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.players)
            .into_iter()
            .partition(|p| p.id() == id);
        self.players = kept;
        removed
    }

    /// Zeroes every player's score.
    pub fn reset_scores(&mut self) {
        self.players.iter_mut().for_each(Player::reset_score);
    }

    /// Number of category columns.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Rows in the tallest column, header included; 0 with no categories.
    pub fn height(&self) -> usize {
        self.categories.iter().map(Category::height).max().unwrap_or(0)
    }

    /// Highest point value anywhere on the board; 0 when there is none.
    pub fn max_points(&self) -> i64 {
        self.categories
            .iter()
            .map(Category::max_points)
            .max()
            .unwrap_or(0)
    }
}

/// Zero-value queries on a board that may be absent.
pub trait OptionalBoard {
    fn width(self) -> usize;
    fn height(self) -> usize;
    fn max_points(self) -> i64;
}

impl OptionalBoard for Option<&Board> {
    fn width(self) -> usize {
        self.map_or(0, Board::width)
    }

    fn height(self) -> usize {
        self.map_or(0, Board::height)
    }

    fn max_points(self) -> i64 {
        self.map_or(0, Board::max_points)
    }
}

/// No-op mutators on a board that may be absent.
///
/// `swap_categories` still reports bad indices on a present board; on an
/// absent board it does nothing and succeeds.
pub trait OptionalBoardMut {
    fn add_categories(self, categories: impl IntoIterator<Item = Category>);
    fn add_players(self, players: impl IntoIterator<Item = Player>);
    fn swap_categories(self, i: usize, j: usize) -> Result<()>;
    fn remove_category(self, id: &CategoryId) -> Vec<Category>;
}

impl OptionalBoardMut for Option<&mut Board> {
    fn add_categories(self, categories: impl IntoIterator<Item = Category>) {
        if let Some(board) = self {
            board.add_categories(categories);
        }
    }

    fn add_players(self, players: impl IntoIterator<Item = Player>) {
        if let Some(board) = self {
            board.add_players(players);
        }
    }

    fn swap_categories(self, i: usize, j: usize) -> Result<()> {
        match self {
            Some(board) => board.swap_categories(i, j),
            None => Ok(()),
        }
    }

    fn remove_category(self, id: &CategoryId) -> Vec<Category> {
        self.map_or_else(Vec::new, |board| board.remove_category(id))
    }
}
