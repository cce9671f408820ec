//! Configuration for cachedhash.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{CachedHashError, CachedHashResult};

/// Main configuration for cachedhash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

const LOG_FORMATS: [&str; 2] = ["text", "json"];

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Which store implementation backs the facade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Unbounded in-process map.
    Memory,
    /// Capacity-bounded in-process LRU.
    Lru,
    /// Persistent SQLite database.
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Lru => write!(f, "lru"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend to use.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Maximum number of entries (lru backend only).
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// SQLite database path.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            capacity: default_capacity(),
            db_path: default_db_path(),
        }
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_capacity() -> usize {
    1000
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".cachedhash/cache.db")
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> CachedHashResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects log settings the subscriber cannot honor.
    pub fn validate(&self) -> CachedHashResult<()> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(CachedHashError::config(format!(
                "unknown log_level '{}' (expected one of: {})",
                self.general.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        if !LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(CachedHashError::config(format!(
                "unknown log_format '{}' (expected one of: {})",
                self.general.log_format,
                LOG_FORMATS.join(", ")
            )));
        }

        Ok(())
    }

    /// Returns `true` when logs should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        self.general.log_format == "json"
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CachedHashResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
