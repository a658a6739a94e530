//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Jeopardy - build and edit trivia game boards
#[derive(Parser, Debug)]
#[command(name = "jeopardy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Environment file to load user settings from
    #[arg(long, global = true)]
    pub env: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty board file
    New {
        /// Board file (".jpdy" is added if missing)
        file: PathBuf,

        /// Board title (default: file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print a board
    Show {
        file: PathBuf,

        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Append a category
    AddCategory {
        file: PathBuf,

        /// Category name; must be unique on the board
        name: String,
    },

    /// Delete a category and its questions
    RemoveCategory { file: PathBuf, name: String },

    /// Swap two category columns by position (0-based)
    SwapCategories {
        file: PathBuf,
        first: usize,
        second: usize,
    },

    /// Add a question to a category
    AddQuestion {
        file: PathBuf,

        /// Category name
        category: String,

        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        answer: String,

        /// Point value (whole number)
        #[arg(long, allow_hyphen_values = true)]
        points: String,
    },

    /// Delete a question by its row in the category (0-based)
    RemoveQuestion {
        file: PathBuf,
        category: String,
        row: usize,
    },

    /// Mark a question as played
    Answer {
        file: PathBuf,
        category: String,
        row: usize,
    },

    /// Add a player with a zero score
    AddPlayer { file: PathBuf, name: String },

    /// Adjust a player's score; negative values deduct
    Score {
        file: PathBuf,
        player: String,

        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },

    /// Zero every player's score
    ResetScores { file: PathBuf },

    /// Show resolved settings
    Config,
}

/// Output format for `show`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Brief,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
