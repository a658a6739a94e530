//! Atomic file operations for crash-safe board files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};

/// File extension for saved boards, without the dot.
pub const BOARD_EXTENSION: &str = "jpdy";

/// Returns `path` with `.jpdy` appended unless it already ends in it.
///
/// Other extensions are kept: `round1.json` becomes `round1.json.jpdy`.
pub fn with_board_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == BOARD_EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(BOARD_EXTENSION);
    PathBuf::from(name)
}

/// Writes data to a file atomically.
///
/// Data goes to a temporary file in the target directory which is then
/// renamed over the target, so readers never observe a partial file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::DirectoryError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Same directory keeps the rename on one filesystem.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source: std::io::Error| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    temp_file.write_all(data).map_err(write_error)?;
    temp_file.as_file().sync_all().map_err(write_error)?;
    temp_file.persist(path).map_err(|e| write_error(e.error))?;

    Ok(())
}
