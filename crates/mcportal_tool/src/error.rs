//! Tool error taxonomy.

use thiserror::Error;

/// Tool result type
pub type ToolResult<T> = Result<T, ToolError>;

/// Error from registration, dispatch, or a handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Definition registered without an identity
    #[error("Tool definition has no identity")]
    InvalidTool,

    /// Dispatch to an identity that was never registered
    #[error("Unknown tool: {identity}")]
    UnknownTool {
        /// Requested identity
        identity: String,
    },

    /// No custom handler bound and no built-in default exists
    #[error("No handler for tool: {identity}")]
    NoHandler {
        /// Tool identity
        identity: String,
    },

    /// Failure raised from inside a handler
    #[error("Tool {identity} failed: {reason}")]
    Execution {
        /// Tool identity
        identity: String,
        /// Handler-provided reason
        reason: String,
    },
}

impl ToolError {
    /// Convenience constructor for handler failures
    #[must_use]
    pub fn execution(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Execution {
            identity: identity.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable tag for this error
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTool => "invalid_tool",
            Self::UnknownTool { .. } => "unknown_tool",
            Self::NoHandler { .. } => "no_handler",
            Self::Execution { .. } => "tool_execution",
        }
    }

    /// Whether the failure happened while running a tool, as opposed to
    /// before one could be selected
    #[must_use]
    pub const fn is_execution_failure(&self) -> bool {
        matches!(self, Self::NoHandler { .. } | Self::Execution { .. })
    }
}
