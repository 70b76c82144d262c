//! Request and response bodies

use crate::error::{ServerError, ServerResult};
use mcportal_tool::Parameters;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Inbound tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Tool identity
    pub tool: String,
    /// Tool parameters; absent or `null` means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parameters: Parameters,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Parameters, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Parameters>::deserialize(deserializer)?.unwrap_or_default())
}

impl InvokeRequest {
    /// Parse a request from a JSON value
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the value is not an object with a string
    /// `tool` and an optional object `parameters`
    pub fn from_value(value: &Value) -> ServerResult<Self> {
        Self::deserialize(value).map_err(|err| ServerError::invalid_request(err.to_string()))
    }
}

/// Failure details carried by an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable kind
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ServerError> for ErrorBody {
    fn from(err: &ServerError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outbound response, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvokeResponse {
    /// Tool ran
    Ok {
        /// Tool identity
        tool: String,
        /// Handler result
        result: Value,
    },
    /// Request failed
    Error {
        /// Failure details
        error: ErrorBody,
    },
}

impl InvokeResponse {
    /// Successful response
    #[must_use]
    pub fn ok(tool: impl Into<String>, result: Value) -> Self {
        Self::Ok {
            tool: tool.into(),
            result,
        }
    }

    /// Failure response for `err`
    #[must_use]
    pub fn failure(err: &ServerError) -> Self {
        Self::Error { error: err.into() }
    }

    /// Render as a JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Ok { tool, result } => json!({ "status": "ok", "tool": tool, "result": result }),
            Self::Error { error } => json!({
                "status": "error",
                "error": { "kind": error.kind, "message": error.message },
            }),
        }
    }
}
