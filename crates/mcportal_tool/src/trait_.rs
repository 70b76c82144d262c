//! Handler trait

use crate::error::ToolResult;
use serde_json::{Map, Value};

/// Parameters passed to a tool: a JSON object
pub type Parameters = Map<String, Value>;

/// A replaceable implementation of one tool
pub trait ToolHandler: Send + Sync {
    /// Run the tool. The returned value is passed back to the caller as is.
    fn handle(&self, params: &Parameters) -> ToolResult<Value>;
}

/// Adapter that lets a closure act as a [`ToolHandler`]
pub struct FnHandler<F>(F);

impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(&Parameters) -> ToolResult<Value> + Send + Sync,
{
    fn handle(&self, params: &Parameters) -> ToolResult<Value> {
        (self.0)(params)
    }
}

/// Wrap a closure as a handler
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Parameters) -> ToolResult<Value> + Send + Sync,
{
    FnHandler(f)
}
