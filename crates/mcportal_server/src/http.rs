//! HTTP listener
//!
//! Routes:
//!
//! | method | path | body |
//! |---|---|---|
//! | GET | `/health` | liveness and version |
//! | GET | `/tools` | registered tool descriptors |
//! | POST | `/invoke` | [`BridgeServer::handle_request`] |
//! | GET | `/trace` | summary of the live trace |
//! | GET | `/traces` | stored trace listing |
//! | GET | `/traces/{id}` | one stored trace |

use crate::bridge::BridgeServer;
use crate::error::{ServerError, ServerResult};
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mcportal_trace::{TraceListing, TraceStore, TraceSummary};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

type AppState = Arc<BridgeServer>;

/// Build the router for `bridge`
pub fn router(bridge: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(tools))
        .route("/invoke", post(invoke))
        .route("/trace", get(live_trace))
        .route("/traces", get(list_traces))
        .route("/traces/{id}", get(trace_details))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(bridge)
}

/// Bind `host:port` and serve `bridge`
///
/// # Errors
///
/// Returns `Bind` if the address cannot be bound, `Serve` if serving fails
pub async fn serve(bridge: AppState, host: &str, port: u16) -> ServerResult<()> {
    let addr = format!("{}:{}", host, port);
    info!(%addr, tools = bridge.tools().len(), "Binding bridge server");

    let listener = TcpListener::bind((host, port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "Bridge server ready to accept connections");

    axum::serve(listener, router(bridge).into_make_service())
        .await
        .map_err(ServerError::Serve)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn tools(State(bridge): State<AppState>) -> Json<Vec<Value>> {
    let tools = bridge.tools().describe();
    debug!(tool_count = tools.len(), "Serving /tools request");
    Json(tools)
}

async fn invoke(State(bridge): State<AppState>, Json(request): Json<Value>) -> Json<Value> {
    Json(bridge.handle_request(request))
}

async fn live_trace(State(bridge): State<AppState>) -> ServerResult<Json<TraceSummary>> {
    bridge.summary().map(Json).ok_or_else(|| ServerError::NotFound {
        what: "Live trace".to_string(),
    })
}

async fn list_traces(State(bridge): State<AppState>) -> ServerResult<Json<Vec<TraceListing>>> {
    let traces = store(&bridge)?.list_traces()?;
    Ok(Json(traces))
}

async fn trace_details(
    State(bridge): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Response> {
    let lookup = store(&bridge)?.trace_details(&id);
    let status = if lookup.details().is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(lookup)).into_response())
}

fn store(bridge: &BridgeServer) -> ServerResult<&TraceStore> {
    bridge.trace_store().ok_or_else(|| ServerError::NotFound {
        what: "Trace storage".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use mcportal_tool::{BuiltinTool, ToolRegistry};
    use mcportal_trace::Tracer;
    use tower::ServiceExt;

    fn traced(dir: &std::path::Path) -> AppState {
        let registry = ToolRegistry::with_builtins(BuiltinTool::ALL);
        Arc::new(BridgeServer::new(
            registry,
            Some(Tracer::with_storage(dir).unwrap()),
        ))
    }

    fn untraced() -> AppState {
        Arc::new(BridgeServer::new(
            ToolRegistry::with_builtins([BuiltinTool::WebSearch]),
            None,
        ))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(router(untraced()), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_tools_lists_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(router(traced(dir.path())), get_request("/tools")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            ["web_search", "code_interpreter", "file_search", "image_generation"]
        );
    }

    #[tokio::test]
    async fn test_invoke_roundtrip_through_trace() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = traced(dir.path());

        let (status, body) = send(
            router(bridge.clone()),
            post_json(
                "/invoke",
                r#"{"tool":"image_generation","parameters":{"prompt":"a fox"}}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(
            body["result"]["message"],
            "This is a placeholder for image generation with prompt: a fox"
        );

        let (status, summary) = send(router(bridge.clone()), get_request("/trace")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["event_count"], 2);

        let (status, listing) = send(router(bridge.clone()), get_request("/traces")).await;
        assert_eq!(status, StatusCode::OK);
        let id = bridge.tracer().unwrap().trace_id().to_string();
        assert_eq!(listing[0]["trace_id"], id.as_str());
        assert_eq!(listing[0]["event_count"], 2);

        let (status, details) =
            send(router(bridge), get_request(&format!("/traces/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["event_types"]["request_received"], 1);
        assert_eq!(details["events"][1]["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_invoke_failure_is_still_ok_status() {
        let (status, body) = send(
            router(untraced()),
            post_json("/invoke", r#"{"tool":"file_search"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"]["kind"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_invoke_rejects_non_json() {
        let (status, _) = send(router(untraced()), post_json("/invoke", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_trace_routes_without_tracing() {
        let (status, _) = send(router(untraced()), get_request("/trace")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = send(router(untraced()), get_request("/traces")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_trace_details_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            router(traced(dir.path())),
            get_request("/traces/missing-id"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Trace missing-id not found");
    }
}
