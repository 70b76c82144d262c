//! Tool definitions.

use crate::catalog::BuiltinTool;
use crate::error::{ToolError, ToolResult};
use crate::schema::{ParameterSchema, ParameterSpec};
use crate::trait_::{Parameters, ToolHandler};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Description of one tool plus its optional custom handler
///
/// Identity, name, description, and schema are fixed at construction. The
/// handler can be rebound any number of times; the last binding wins.
#[derive(Clone)]
pub struct ToolDefinition {
    identity: String,
    display_name: String,
    description: String,
    parameters: ParameterSchema,
    handler: Option<Arc<dyn ToolHandler>>,
    fallback: Option<BuiltinTool>,
}

impl ToolDefinition {
    /// Create a new definition with no parameters and no handler
    #[must_use]
    pub fn new(
        identity: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let identity = identity.into();
        let fallback = BuiltinTool::from_identity(&identity);
        Self {
            identity,
            display_name: display_name.into(),
            description: description.into(),
            parameters: ParameterSchema::new(),
            handler: None,
            fallback,
        }
    }

    /// Set the full parameter schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = parameters;
        self
    }

    /// Add one parameter
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters = self.parameters.with_param(name, spec);
        self
    }

    /// Bind a custom handler
    #[must_use]
    pub fn with_handler(mut self, handler: impl ToolHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Rebind the custom handler, replacing any earlier one
    pub fn set_handler(&mut self, handler: Arc<dyn ToolHandler>) -> &mut Self {
        self.handler = Some(handler);
        self
    }

    /// Drop the custom handler, falling back to the built-in default
    pub fn clear_handler(&mut self) -> &mut Self {
        self.handler = None;
        self
    }

    /// Unique registry key
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Human-readable name
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared parameters
    #[must_use]
    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    /// Whether a custom handler is bound
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Run the tool
    ///
    /// A bound handler's result is returned verbatim. Otherwise the
    /// built-in default for the identity runs.
    ///
    /// # Errors
    ///
    /// Returns `NoHandler` if neither exists, or whatever the custom
    /// handler returns
    pub fn handle(&self, params: &Parameters) -> ToolResult<Value> {
        let mismatched = self.parameters.mismatches(params);
        if !mismatched.is_empty() {
            debug!(tool = %self.identity, parameters = ?mismatched, "Parameters do not match schema");
        }
        if let Some(handler) = &self.handler {
            return handler.handle(params);
        }
        match self.fallback {
            Some(builtin) => Ok((builtin.default_handler())(params)),
            None => Err(ToolError::NoHandler {
                identity: self.identity.clone(),
            }),
        }
    }

    /// Listing descriptor for clients
    #[must_use]
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.identity,
            "display_name": self.display_name,
            "description": self.description,
            "parameters": self.parameters.to_json_schema(),
            "custom_handler": self.has_handler(),
        })
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("identity", &self.identity)
            .field("display_name", &self.display_name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("custom_handler", &self.has_handler())
            .finish()
    }
}
