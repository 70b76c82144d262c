//! Tool registry: identity to definition, plus dispatch.

use crate::catalog::BuiltinTool;
use crate::definition::ToolDefinition;
use crate::error::{ToolError, ToolResult};
use crate::trait_::{Parameters, ToolHandler};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registry for tools
///
/// Each registry owns its definitions, so binding a handler here never
/// affects another registry. Registering an identity twice replaces the
/// earlier definition.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    /// Registered tools by identity
    tools: IndexMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Create a registry holding the given catalog entries
    #[must_use]
    pub fn with_builtins(tools: impl IntoIterator<Item = BuiltinTool>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.tools.insert(tool.identity().to_string(), tool.definition());
        }
        registry
    }

    /// Register a tool, replacing any earlier one with the same identity
    ///
    /// # Errors
    ///
    /// Returns `InvalidTool` if the identity is empty
    pub fn register(&mut self, definition: ToolDefinition) -> ToolResult<()> {
        if definition.identity().trim().is_empty() {
            return Err(ToolError::InvalidTool);
        }
        let identity = definition.identity().to_string();
        if self.tools.insert(identity.clone(), definition).is_some() {
            debug!(tool = %identity, "Replaced tool definition");
        } else {
            debug!(tool = %identity, "Registered tool");
        }
        Ok(())
    }

    /// Run the tool registered under `identity`
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if nothing is registered under `identity`;
    /// handler errors are returned unchanged
    pub fn dispatch(&self, identity: &str, params: &Parameters) -> ToolResult<Value> {
        let definition = self.lookup(identity)?;
        debug!(tool = %identity, custom = definition.has_handler(), "Dispatching");
        definition.handle(params)
    }

    /// Bind a custom handler to a registered tool
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if nothing is registered under `identity`
    pub fn set_handler(
        &mut self,
        identity: &str,
        handler: impl ToolHandler + 'static,
    ) -> ToolResult<()> {
        self.set_shared_handler(identity, Arc::new(handler))
    }

    /// Bind an already shared handler to a registered tool
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if nothing is registered under `identity`
    pub fn set_shared_handler(
        &mut self,
        identity: &str,
        handler: Arc<dyn ToolHandler>,
    ) -> ToolResult<()> {
        self.lookup_mut(identity)?.set_handler(handler);
        debug!(tool = %identity, "Bound custom handler");
        Ok(())
    }

    /// Remove a tool's custom handler
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if nothing is registered under `identity`
    pub fn clear_handler(&mut self, identity: &str) -> ToolResult<()> {
        self.lookup_mut(identity)?.clear_handler();
        Ok(())
    }

    /// Get a tool definition by identity
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&ToolDefinition> {
        self.tools.get(identity)
    }

    /// Check if a tool is registered
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.tools.contains_key(identity)
    }

    /// Registered identities in registration order
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Listing descriptors for every tool
    #[must_use]
    pub fn describe(&self) -> Vec<Value> {
        self.tools.values().map(ToolDefinition::descriptor).collect()
    }

    /// Get the count of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn lookup(&self, identity: &str) -> ToolResult<&ToolDefinition> {
        self.tools.get(identity).ok_or_else(|| ToolError::UnknownTool {
            identity: identity.to_string(),
        })
    }

    fn lookup_mut(&mut self, identity: &str) -> ToolResult<&mut ToolDefinition> {
        self.tools
            .get_mut(identity)
            .ok_or_else(|| ToolError::UnknownTool {
                identity: identity.to_string(),
            })
    }
}

/// Thread-safe registry for concurrent access
///
/// Dispatch clones the definition under the read lock and runs the handler
/// after releasing it, so a slow handler never blocks registration.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    inner: RwLock<ToolRegistry>,
}

impl SharedRegistry {
    /// Create a new shared registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing registry
    #[must_use]
    pub fn from_registry(registry: ToolRegistry) -> Self {
        Self {
            inner: RwLock::new(registry),
        }
    }

    /// Register a tool
    ///
    /// # Errors
    ///
    /// Returns `InvalidTool` if the identity is empty
    pub fn register(&self, definition: ToolDefinition) -> ToolResult<()> {
        self.write().register(definition)
    }

    /// Run a tool
    ///
    /// # Errors
    ///
    /// Same as [`ToolRegistry::dispatch`]
    pub fn dispatch(&self, identity: &str, params: &Parameters) -> ToolResult<Value> {
        let definition = self
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool {
                identity: identity.to_string(),
            })?;
        debug!(tool = %identity, custom = definition.has_handler(), "Dispatching");
        definition.handle(params)
    }

    /// Bind a custom handler
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if nothing is registered under `identity`
    pub fn set_handler(
        &self,
        identity: &str,
        handler: impl ToolHandler + 'static,
    ) -> ToolResult<()> {
        self.write().set_handler(identity, handler)
    }

    /// Check if a tool is registered
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.read().contains(identity)
    }

    /// Registered identities in registration order
    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        self.read().identities()
    }

    /// Listing descriptors for every tool
    #[must_use]
    pub fn describe(&self) -> Vec<Value> {
        self.read().describe()
    }

    /// Get the count of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ToolRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ToolRegistry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<ToolRegistry> for SharedRegistry {
    fn from(registry: ToolRegistry) -> Self {
        Self::from_registry(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParameterSpec;
    use crate::trait_::handler_fn;
    use proptest::prelude::*;
    use serde_json::json;

    fn make_tool(identity: &str, description: &str) -> ToolDefinition {
        ToolDefinition::new(identity, identity, description)
    }

    #[test]
    fn test_registry_new() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register() {
        let mut registry = ToolRegistry::new();
        registry.register(BuiltinTool::WebSearch.definition()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("web_search"));
    }

    #[test]
    fn test_registry_register_empty_identity() {
        let mut registry = ToolRegistry::new();
        assert_eq!(
            registry.register(make_tool("", "nameless")),
            Err(ToolError::InvalidTool)
        );
        assert_eq!(
            registry.register(make_tool("   ", "blank")),
            Err(ToolError::InvalidTool)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_register_duplicate_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(make_tool("custom", "first")).unwrap();
        registry.register(make_tool("custom", "second")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("custom").unwrap().description(), "second");
    }

    #[test]
    fn test_dispatch_unknown() {
        let registry = ToolRegistry::with_builtins(BuiltinTool::ALL);
        let err = registry.dispatch("unknown_id", &Parameters::new()).unwrap_err();
        assert_eq!(
            err,
            ToolError::UnknownTool {
                identity: "unknown_id".to_string()
            }
        );
    }

    #[test]
    fn test_dispatch_default() {
        let registry = ToolRegistry::with_builtins([BuiltinTool::FileSearch]);
        let mut params = Parameters::new();
        params.insert("path".to_string(), json!("docs"));
        let out = registry.dispatch("file_search", &params).unwrap();
        assert_eq!(out["files"][0], "docs/example-file-1.txt");
    }

    #[test]
    fn test_dispatch_no_handler() {
        let mut registry = ToolRegistry::new();
        registry
            .register(make_tool("weather", "Forecasts").with_parameter(
                "city",
                ParameterSpec::string("City"),
            ))
            .unwrap();
        let err = registry.dispatch("weather", &Parameters::new()).unwrap_err();
        assert_eq!(err.kind(), "no_handler");
    }

    #[test]
    fn test_set_handler_scoped_to_registry() {
        let mut first = ToolRegistry::with_builtins([BuiltinTool::WebSearch]);
        let second = ToolRegistry::with_builtins([BuiltinTool::WebSearch]);

        first
            .set_handler("web_search", handler_fn(|_| Ok(json!({ "from": "first" }))))
            .unwrap();

        let params = Parameters::new();
        assert_eq!(
            first.dispatch("web_search", &params).unwrap(),
            json!({ "from": "first" })
        );
        let out = second.dispatch("web_search", &params).unwrap();
        assert_eq!(out["message"], "This is a placeholder result for: ");
    }

    #[test]
    fn test_set_handler_unknown() {
        let mut registry = ToolRegistry::new();
        let err = registry
            .set_handler("missing", handler_fn(|_| Ok(Value::Null)))
            .unwrap_err();
        assert_eq!(err.kind(), "unknown_tool");
    }

    #[test]
    fn test_clear_handler() {
        let mut registry = ToolRegistry::with_builtins([BuiltinTool::ImageGeneration]);
        registry
            .set_handler("image_generation", handler_fn(|_| Ok(json!("custom"))))
            .unwrap();
        registry.clear_handler("image_generation").unwrap();
        let out = registry
            .dispatch("image_generation", &Parameters::new())
            .unwrap();
        assert_eq!(out["image_url"], "https://example.com/placeholder-image.png");
    }

    #[test]
    fn test_identities_in_registration_order() {
        let registry = ToolRegistry::with_builtins([
            BuiltinTool::ImageGeneration,
            BuiltinTool::WebSearch,
        ]);
        assert_eq!(registry.identities(), vec!["image_generation", "web_search"]);
        assert_eq!(registry.describe().len(), 2);
    }

    #[test]
    fn test_shared_registry() {
        let shared = SharedRegistry::new();
        shared.register(BuiltinTool::CodeInterpreter.definition()).unwrap();
        assert_eq!(shared.identities(), vec!["code_interpreter"]);
        assert!(shared.contains("code_interpreter"));

        shared
            .set_handler("code_interpreter", handler_fn(|_| Ok(json!({ "ran": true }))))
            .unwrap();
        assert_eq!(
            shared.dispatch("code_interpreter", &Parameters::new()).unwrap(),
            json!({ "ran": true })
        );
        assert!(shared.dispatch("nope", &Parameters::new()).is_err());
    }

    #[test]
    fn test_shared_registry_concurrent_dispatch() {
        let shared = Arc::new(SharedRegistry::from(ToolRegistry::with_builtins(
            BuiltinTool::ALL,
        )));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        shared
                            .register(make_tool(&format!("tool_{}", i), "extra"))
                            .unwrap();
                    }
                    shared.dispatch("web_search", &Parameters::new()).is_ok()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(shared.len(), 8);
    }

    proptest! {
        #[test]
        fn prop_last_registration_wins(
            identity in "[a-z_]{1,12}",
            descriptions in proptest::collection::vec("[a-z ]{0,16}", 1..6),
        ) {
            let mut registry = ToolRegistry::new();
            for description in &descriptions {
                registry.register(make_tool(&identity, description)).unwrap();
            }
            prop_assert_eq!(registry.len(), 1);
            prop_assert_eq!(
                registry.get(&identity).unwrap().description(),
                descriptions.last().unwrap().as_str()
            );
        }

        #[test]
        fn prop_unregistered_dispatch_fails(identity in "[a-z_]{1,12}") {
            prop_assume!(BuiltinTool::from_identity(&identity).is_none());
            let registry = ToolRegistry::with_builtins(BuiltinTool::ALL);
            let is_unknown = matches!(
                registry.dispatch(&identity, &Parameters::new()),
                Err(ToolError::UnknownTool { .. })
            );
            prop_assert!(is_unknown);
        }
    }
}
