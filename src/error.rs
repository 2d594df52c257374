//! Error types for the scheduler crate.
//!
//! The scheduling core itself is total and never fails. Errors only come from
//! the edges: storage, configuration, file export and strict input validation.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No scheduling record for user '{user_id}' and flashcard '{flashcard_id}'")]
    RecordNotFound {
        user_id: String,
        flashcard_id: String,
    },

    #[error("No cards are currently due for review")]
    NothingToExport,

    #[error("Record store lock was poisoned")]
    LockPoisoned,
}

/// Problems with a value crossing into the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid quality score {0}: must be between 0 and 5")]
    InvalidQuality(i64),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Easiness factor {0} is below the 1.3 floor")]
    EasinessBelowFloor(f64),

    #[error("Due date precedes last review")]
    DueBeforeReview,

    #[error("Timestamp {0} ms is out of range")]
    TimestampOutOfRange(i64),

    #[error("Moving the date by {0} days leaves the supported range")]
    DayOffsetOutOfRange(i64),
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
