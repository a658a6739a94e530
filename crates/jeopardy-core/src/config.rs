//! User configuration for the Jeopardy editor.
//!
//! Settings come from environment variables, optionally seeded from an
//! environment file read once at startup. Unset keys fall back to
//! built-in defaults.
//!
//! # Environment Variables
//!
//! - `JPDY_BORDER_COLOR`: Hex colour for board borders (default `#b31b1b`)
//! - `JPDY_BOARD_DIR`: Directory relative board paths resolve against
//!   (default: current directory)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

/// Environment variable for the board border colour.
pub const BORDER_COLOR_ENV: &str = "JPDY_BORDER_COLOR";

/// Environment variable for the default board directory.
pub const BOARD_DIR_ENV: &str = "JPDY_BOARD_DIR";

/// Environment file tried when none is given explicitly.
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Built-in values for keys that are not set.
const DEFAULTS: &[(&str, &str)] = &[(BORDER_COLOR_ENV, "#b31b1b")];

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested environment file could not be loaded.
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// A colour value was not `#rgb` or `#rrggbb`.
    #[error("invalid colour {value:?} for {key}: {reason}")]
    InvalidColor {
        key: String,
        value: String,
        reason: String,
    },
}

/// Loads an environment file into the process environment.
///
/// With an explicit path the file must exist and parse. Without one,
/// [`DEFAULT_ENV_FILE`] is loaded if present. Variables already set in the
/// environment are not overridden. Returns the file that was loaded.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), "Loaded environment file");
            Ok(Some(path.to_path_buf()))
        }
        None => {
            let loaded = dotenvy::from_filename(DEFAULT_ENV_FILE).ok();
            if let Some(path) = &loaded {
                debug!(path = %path.display(), "Loaded default environment file");
            }
            Ok(loaded)
        }
    }
}

/// Built-in default for a key, if it has one.
pub fn default_value(key: &str) -> Option<&'static str> {
    DEFAULTS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Value of `key` from the environment, falling back to its default.
pub fn value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| default_value(key).map(String::from))
}

/// An opaque RGB colour parsed from hex notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FromStr for HexColor {
    type Err = String;

    /// Accepts `#rrggbb` and the short form `#rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| "missing leading '#'".to_string())?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("non-hex digit".to_string());
        }

        let channel = |hex: &str| u8::from_str_radix(hex, 16).map_err(|e| e.to_string());
        match digits.len() {
            6 => Ok(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            // #abc expands to #aabbcc
            3 => Ok(Self {
                r: channel(&digits[0..1])? * 0x11,
                g: channel(&digits[1..2])? * 0x11,
                b: channel(&digits[2..3])? * 0x11,
            }),
            n => Err(format!("expected 3 or 6 hex digits, got {}", n)),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Resolved user settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub border_color: HexColor,
    pub board_dir: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, applying defaults for missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).or_else(|| default_value(key).map(String::from));

        let raw_color = get(BORDER_COLOR_ENV).unwrap_or_default();
        let border_color =
            raw_color
                .parse::<HexColor>()
                .map_err(|reason| ConfigError::InvalidColor {
                    key: BORDER_COLOR_ENV.to_string(),
                    value: raw_color.clone(),
                    reason,
                })?;

        let board_dir = get(BOARD_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            border_color,
            board_dir,
        })
    }

    /// Resolves a board path against [`Settings::board_dir`]; absolute
    /// paths are returned unchanged.
    pub fn resolve_board_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.board_dir.join(path)
        }
    }
}
