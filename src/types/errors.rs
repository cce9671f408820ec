//! Error types for cachedhash.

use thiserror::Error;

/// Default result type for cachedhash.
pub type CachedHashResult<T> = Result<T, CachedHashError>;

/// Errors raised by the facade, the bundled stores and the CLI.
#[derive(Error, Debug)]
pub enum CachedHashError {
    #[error("Cache facade built without a store")]
    MissingStore,

    #[error("Store error: {0}")]
    Store(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command failed: {0}")]
    Command(String),
}

impl CachedHashError {
    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a store backend error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }
}
