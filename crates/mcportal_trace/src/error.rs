//! Trace errors.

use std::path::PathBuf;
use thiserror::Error;

/// Trace result type
pub type TraceResult<T> = Result<T, TraceError>;

/// Error from recording or reading traces
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The storage directory cannot be created or resolved
    #[error("Trace storage unavailable at {path}: {reason}")]
    StorageUnavailable {
        /// Directory that could not be prepared
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// An event was kept in memory but could not be written durably
    #[error("Failed to persist event to {path}: {reason}")]
    Persistence {
        /// Trace file
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// A trace directory or file could not be read
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// Path being read
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// An event could not be serialized
    #[error("Event encoding failed: {reason}")]
    Encoding {
        /// Serializer message
        reason: String,
    },
}

impl TraceError {
    /// Stable machine-readable tag for this error
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::Persistence { .. } => "persistence",
            Self::Read { .. } => "read",
            Self::Encoding { .. } => "encoding",
        }
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceError::Persistence {
            path: PathBuf::from("/tmp/t.jsonl"),
            reason: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to persist event to /tmp/t.jsonl: disk full");
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TraceError::from(json_err);
        assert_eq!(err.kind(), "encoding");
    }
}
