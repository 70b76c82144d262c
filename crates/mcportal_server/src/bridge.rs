//! Request orchestration

use crate::error::{ServerError, ServerResult};
use crate::request::{InvokeRequest, InvokeResponse};
use mcportal_tool::{SharedRegistry, ToolDefinition, ToolRegistry, ToolResult};
use mcportal_trace::{TraceStore, TraceSummary, Tracer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Event recorded when a request arrives
pub const REQUEST_RECEIVED: &str = "request_received";
/// Event recorded after the response is built
pub const RESPONSE_SENT: &str = "response_sent";

/// Bridge between inbound requests, the tool registry, and the trace
#[derive(Debug)]
pub struct BridgeServer {
    registry: SharedRegistry,
    tracer: Option<Tracer>,
    store: Option<TraceStore>,
}

impl BridgeServer {
    /// Create a bridge. Stored traces are read from the tracer's directory.
    #[must_use]
    pub fn new(registry: ToolRegistry, tracer: Option<Tracer>) -> Self {
        let store = tracer
            .as_ref()
            .map(|tracer| TraceStore::new(tracer.storage_path()));
        Self {
            registry: registry.into(),
            tracer,
            store,
        }
    }

    /// Read stored traces from `store` instead
    #[must_use]
    pub fn with_trace_store(mut self, store: TraceStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a tool, replacing any tool with the same identity
    ///
    /// # Errors
    ///
    /// Returns `InvalidTool` if the identity is empty
    pub fn register_tools(&self, definition: ToolDefinition) -> ToolResult<()> {
        self.registry.register(definition)
    }

    /// Handle one request and return its response body
    ///
    /// Never fails: every error becomes an error-shaped response. Trace
    /// write failures are logged by the tracer and otherwise ignored.
    pub fn handle_request(&self, request: Value) -> Value {
        self.record(REQUEST_RECEIVED, request.clone());

        let response = match self.invoke(&request) {
            Ok((tool, result)) => InvokeResponse::ok(tool, result),
            Err(err) => {
                if matches!(&err, ServerError::Tool(tool_err) if tool_err.is_execution_failure()) {
                    warn!(error = %err, "Tool execution failed");
                } else {
                    debug!(kind = err.kind(), error = %err, "Request rejected");
                }
                InvokeResponse::failure(&err)
            }
        };

        let body = response.to_value();
        self.record(RESPONSE_SENT, body.clone());
        body
    }

    /// Bind `host:port` and serve until the listener fails
    ///
    /// # Errors
    ///
    /// Returns `Bind` or `Serve` on listener failure
    pub async fn start(self, host: &str, port: u16) -> ServerResult<()> {
        crate::http::serve(Arc::new(self), host, port).await
    }

    /// Tool registry
    #[must_use]
    pub fn tools(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Live trace, if tracing is on
    #[must_use]
    pub fn tracer(&self) -> Option<&Tracer> {
        self.tracer.as_ref()
    }

    /// Reader over stored traces, if a storage directory is known
    #[must_use]
    pub fn trace_store(&self) -> Option<&TraceStore> {
        self.store.as_ref()
    }

    /// Summary of the live trace
    #[must_use]
    pub fn summary(&self) -> Option<TraceSummary> {
        self.tracer.as_ref().map(Tracer::summary)
    }

    fn invoke(&self, request: &Value) -> ServerResult<(String, Value)> {
        let InvokeRequest { tool, parameters } = InvokeRequest::from_value(request)?;
        debug!(tool = %tool, "Dispatching request");
        let result = self.registry.dispatch(&tool, &parameters)?;
        Ok((tool, result))
    }

    fn record(&self, event_type: &str, data: Value) {
        if let Some(tracer) = &self.tracer {
            if let Err(err) = tracer.record_event(event_type, data) {
                debug!(event_type, kind = err.kind(), "Continuing without persisted event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcportal_tool::{BuiltinTool, ToolError, handler_fn};
    use mcportal_trace::TraceLookup;
    use serde_json::json;

    fn traced_bridge(dir: &std::path::Path) -> BridgeServer {
        let registry = ToolRegistry::with_builtins([BuiltinTool::WebSearch]);
        BridgeServer::new(registry, Some(Tracer::with_storage(dir).unwrap()))
    }

    #[test]
    fn test_handle_request_default_handler() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = traced_bridge(dir.path());

        let response = bridge.handle_request(json!({
            "tool": "web_search",
            "parameters": { "query": "rust" },
        }));
        assert_eq!(response["status"], "ok");
        assert_eq!(response["tool"], "web_search");
        assert_eq!(
            response["result"]["message"],
            "This is a placeholder result for: rust"
        );

        let summary = bridge.summary().unwrap();
        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.event_types[REQUEST_RECEIVED], 1);
        assert_eq!(summary.event_types[RESPONSE_SENT], 1);

        let timeline = bridge.tracer().unwrap().timeline();
        assert_eq!(timeline[0].event_type, REQUEST_RECEIVED);
        assert_eq!(timeline[0].data["parameters"]["query"], "rust");
        assert_eq!(timeline[1].data, response);
    }

    #[test]
    fn test_handle_request_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = traced_bridge(dir.path());

        let response = bridge.handle_request(json!({ "tool": "teleport" }));
        assert_eq!(response["status"], "error");
        assert_eq!(response["error"]["kind"], "unknown_tool");
        assert_eq!(bridge.summary().unwrap().event_count, 2);
    }

    #[test]
    fn test_handle_request_malformed() {
        let bridge = BridgeServer::new(ToolRegistry::new(), None);
        let response = bridge.handle_request(json!({ "parameters": {} }));
        assert_eq!(response["status"], "error");
        assert_eq!(response["error"]["kind"], "invalid_request");
        assert!(bridge.summary().is_none());
    }

    #[test]
    fn test_handler_error_becomes_response() {
        let bridge = BridgeServer::new(ToolRegistry::new(), None);
        let failing = ToolDefinition::new("flaky", "Flaky", "Always fails").with_handler(
            handler_fn(|_| Err(ToolError::execution("flaky", "upstream timed out"))),
        );
        bridge.register_tools(failing).unwrap();

        let response = bridge.handle_request(json!({ "tool": "flaky" }));
        assert_eq!(response["error"]["kind"], "tool_execution");
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .contains("upstream timed out")
        );
    }

    #[test]
    fn test_custom_tool_without_handler() {
        let bridge = BridgeServer::new(ToolRegistry::new(), None);
        bridge
            .register_tools(ToolDefinition::new("bare", "Bare", "No behavior"))
            .unwrap();
        let response = bridge.handle_request(json!({ "tool": "bare" }));
        assert_eq!(response["error"]["kind"], "no_handler");
    }

    #[test]
    fn test_register_tools_rejects_empty_identity() {
        let bridge = BridgeServer::new(ToolRegistry::new(), None);
        let err = bridge
            .register_tools(ToolDefinition::new("", "Nameless", ""))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidTool));
        assert!(bridge.tools().is_empty());
    }

    #[test]
    fn test_persistence_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = traced_bridge(dir.path());
        std::fs::create_dir_all(bridge.tracer().unwrap().trace_file()).unwrap();

        let response = bridge.handle_request(json!({ "tool": "web_search" }));
        assert_eq!(response["status"], "ok");
        assert_eq!(response["result"]["message"], "This is a placeholder result for: ");
        assert_eq!(bridge.summary().unwrap().event_count, 2);
    }

    #[test]
    fn test_requests_readable_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = traced_bridge(dir.path());
        bridge.handle_request(json!({ "tool": "web_search", "parameters": { "query": "q" } }));

        let id = bridge.tracer().unwrap().trace_id().to_string();
        let store = bridge.trace_store().unwrap();
        match store.trace_details(&id) {
            TraceLookup::Found(details) => {
                assert_eq!(details.event_count, 2);
                assert_eq!(details.events[1].data["status"], "ok");
            }
            TraceLookup::Failed { error } => panic!("lookup failed: {}", error),
        }
    }
}
