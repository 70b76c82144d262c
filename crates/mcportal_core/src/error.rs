//! Core error types for MCPortal.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Invalid ID format
    #[error("Invalid ID: {reason}")]
    InvalidId {
        /// Why the ID was rejected
        reason: String,
    },

    /// Invalid timestamp
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        /// Why the timestamp was rejected
        reason: String,
    },

    /// Configuration file could not be read
    #[error("Cannot read config {path}: {reason}")]
    ConfigRead {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O failure
        reason: String,
    },

    /// Configuration could not be parsed
    #[error("Invalid config: {reason}")]
    ConfigParse {
        /// Parser message
        reason: String,
    },

    /// No home directory to derive the default trace location from
    #[error("Home directory not available")]
    NoHomeDirectory,
}

impl CoreError {
    /// Stable machine-readable tag for this error
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "invalid_id",
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
            Self::ConfigRead { .. } => "config_read",
            Self::ConfigParse { .. } => "config_parse",
            Self::NoHomeDirectory => "no_home_directory",
        }
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse {
            reason: err.message().to_string(),
        }
    }
}
