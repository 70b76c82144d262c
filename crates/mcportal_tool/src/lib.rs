//! MCPortal Tool System
//!
//! Named, parameterized tools behind one dispatch interface. A tool's
//! behavior resolves in three tiers: a bound custom handler, then the
//! built-in default for its catalog identity, then a `NoHandler` error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod definition;
pub mod error;
pub mod registry;
pub mod schema;
pub mod trait_;

pub use catalog::BuiltinTool;
pub use definition::ToolDefinition;
pub use error::{ToolError, ToolResult};
pub use registry::{SharedRegistry, ToolRegistry};
pub use schema::{ParamType, ParameterSchema, ParameterSpec};
pub use trait_::{FnHandler, Parameters, ToolHandler, handler_fn};
