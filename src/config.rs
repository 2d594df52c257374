//! TOML-based configuration.
//!
//! ```toml
//! [database]
//! path = "db.sqlite3"
//!
//! [review]
//! default_limit = 20
//! export_limit = 1000
//! strict_quality = false
//!
//! [clock]
//! simulated = false
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use crate::error::ConfigError;
use crate::models::{DEFAULT_DUE_LIMIT, EXPORT_DUE_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Cards returned by a normal due-card query.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Cards fetched for a due report export.
    #[serde(default = "default_export_limit")]
    pub export_limit: usize,
    /// Reject quality outside 0-5 instead of clamping.
    #[serde(default)]
    pub strict_quality: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Use the date stored in the database instead of the wall clock.
    #[serde(default)]
    pub simulated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("db.sqlite3")
}
fn default_limit() -> usize {
    DEFAULT_DUE_LIMIT
}
fn default_export_limit() -> usize {
    EXPORT_DUE_LIMIT
}
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            export_limit: default_export_limit(),
            strict_quality: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads from `path`, falling back to defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.review.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "review.default_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if self.review.export_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "review.export_limit",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
