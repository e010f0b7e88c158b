//! Error types for notchfocus-core.
//!
//! Session operations themselves are total over the state space and never
//! fail; errors exist only at the storage and network edges.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for notchfocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Update check error: {0}")]
    Update(#[from] UpdateError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Database is locked")]
    Locked,

    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

/// Settings persistence errors. Validation failures are not errors --
/// numeric inputs are clamped into range, never rejected.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Failed to parse settings: {0}")]
    ParseFailed(String),

    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Release-metadata polling errors.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid release endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Release endpoint returned HTTP {0}")]
    BadStatus(u16),

    #[error("Malformed release metadata: {0}")]
    MalformedResponse(String),
}

/// Collaborator (audio, notification, sound) failures. These are logged
/// and degrade gracefully -- session timing is never blocked by them.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Audio backend unavailable: {0}")]
    AudioUnavailable(String),

    #[error("Notification delivery failed: {0}")]
    NotificationFailed(String),

    #[error("Sound playback failed: {0}")]
    PlaybackFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
