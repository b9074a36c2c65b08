//! Error types for watchlist operations

use thiserror::Error;

/// Storage layer errors raised by collaborator implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file: {reason}")]
    Io { reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all watchlist errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid expiry '{value}': {reason}")]
    InvalidExpiry { value: String, reason: String },

    #[error("Unknown capability: {name}")]
    InvalidCapability { name: String },
}

/// Result type alias for watchlist operations.
pub type WatchlistResult<T> = Result<T, WatchlistError>;

// =============================================================================
// TESTS
// =============================================================================
