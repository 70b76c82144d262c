//! Server errors

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mcportal_tool::ToolError;
use mcportal_trace::TraceError;
use serde_json::json;
use thiserror::Error;

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Bridge server error
#[derive(Debug, Error)]
pub enum ServerError {
    /// Request body does not have the expected shape
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong
        reason: String,
    },

    /// Registration or dispatch failure
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Trace construction or storage failure
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// Requested resource does not exist
    #[error("{what} not found")]
    NotFound {
        /// Resource description
        what: String,
    },

    /// Listener could not bind
    #[error("Failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Listener failed while serving
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ServerError {
    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Tool(err) => err.kind(),
            Self::Trace(err) => err.kind(),
            Self::NotFound { .. } => "not_found",
            Self::Bind { .. } => "bind",
            Self::Serve(_) => "serve",
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } | Self::Tool(ToolError::InvalidTool) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } | Self::Tool(ToolError::UnknownTool { .. }) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (self.status(), Json(body)).into_response()
    }
}
