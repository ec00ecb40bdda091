//! Error types for chatterbox-core

use thiserror::Error;

/// Result type alias for chatterbox operations
pub type Result<T> = std::result::Result<T, ChatterboxError>;

/// Main error type for chatterbox operations
#[derive(Error, Debug)]
pub enum ChatterboxError {
    /// Persistence-related errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration-related errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl ChatterboxError {
    /// True when the failure came from a column constraint (NOT NULL, length bound)
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            ChatterboxError::Persistence(PersistenceError::ConstraintViolation(_))
        )
    }
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// A write was rejected by a table constraint
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Another holder of the connection panicked
    #[error("Connection lock poisoned")]
    LockPoisoned,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    /// Config file is not valid TOML for the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                PersistenceError::ConstraintViolation(msg.unwrap_or_else(|| e.to_string()))
            }
            other => PersistenceError::Database(other.to_string()),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for ChatterboxError {
    fn from(err: rusqlite::Error) -> Self {
        ChatterboxError::Persistence(PersistenceError::from(err))
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
