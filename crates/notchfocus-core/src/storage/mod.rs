mod database;

pub use database::{Database, ProgressRecord};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/notchfocus[-dev]/` based on NOTCHFOCUS_ENV.
///
/// Set NOTCHFOCUS_ENV=dev to use the development data directory, or
/// NOTCHFOCUS_DATA_DIR to point at an explicit directory (used by the
/// CLI test suite).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = if let Ok(explicit) = std::env::var("NOTCHFOCUS_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");

        let env = std::env::var("NOTCHFOCUS_ENV").unwrap_or_else(|_| "production".to_string());

        if env == "dev" {
            base_dir.join("notchfocus-dev")
        } else {
            base_dir.join("notchfocus")
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
