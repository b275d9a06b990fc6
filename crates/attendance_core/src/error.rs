//! Error taxonomy for the attendance tracker

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Bundled reference file missing or unparsable; fatal for the view that needs it
    #[error("Failed to load reference data '{resource}': {reason}")]
    Load { resource: String, reason: String },

    /// Persisted override is not valid JSON; readers fall back to static data
    #[error("Stored '{key}' is corrupt: {reason}")]
    StorageCorrupt { key: String, reason: String },

    /// Rejected user input (credentials, attachment size, unknown meeting, ...)
    #[error("{0}")]
    Validation(String),

    /// Import payload is not a list of records; nothing was imported
    #[error("Import payload must be a list of submissions: {0}")]
    ImportFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
