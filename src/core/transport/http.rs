//! HTTP transport implementation.
//!
//! JSON-RPC 2.0 over POST for clients that cannot hold a stdio or TCP
//! session open. Only the tool surface of MCP is served; each request is
//! answered independently.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;

/// Protocol revision advertised in `initialize` responses.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, -32601, format!("Method not found: {}", method))
    }

    fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
struct AppState {
    server: McpServer,
    /// Set once a client has sent `notifications/initialized`.
    initialized: Arc<AtomicBool>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum application for `server`.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState {
            server,
            initialized: Arc::new(AtomicBool::new(false)),
        };

        let mut app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route("/health", get(health_check))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!(
            "Ready - listening on {} (POST {}, CORS {})",
            addr,
            self.config.rpc_path,
            if self.config.enable_cors { "on" } else { "off" }
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))
    }
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[instrument(skip_all, fields(method = %request.method))]
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let response = process_request(&state, request);
    (StatusCode::OK, Json(response))
}

fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request.id),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => JsonRpcResponse::success(
            request.id,
            json!({ "tools": state.server.list_tools() }),
        ),
        "tools/call" => handle_tools_call(state, request),
        method if method.starts_with("notifications/") => {
            if method == "notifications/initialized" {
                state.initialized.store(true, Ordering::Release);
                info!("Client initialized");
            } else {
                debug!("Ignoring notification {}", method);
            }
            JsonRpcResponse::success(request.id, Value::Null)
        }
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(request.id, method)
        }
    }
}

fn handle_initialize(state: &AppState, id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": state.server.name(),
                "version": state.server.version()
            },
            "instructions": state.server.instructions()
        }),
    )
}

fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    match state.server.call_tool(name, arguments) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::invalid_params(request.id, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, SecurityConfig};
    use axum::body::Body;
    use bytes::Bytes;
    use http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app(dir: &TempDir) -> Router {
        let mut config = Config::default();
        config.security = SecurityConfig {
            work_dir: Some(dir.path().to_path_buf()),
            ..SecurityConfig::default()
        };
        HttpTransport::new(HttpConfig::default()).router(McpServer::new(config))
    }

    async fn rpc(app: Router, body: Value) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes: Bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_advertises_tools_only() {
        let temp_dir = TempDir::new().unwrap();
        let response = rpc(
            test_app(&temp_dir),
            json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} }),
        )
        .await;

        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert!(response["result"]["capabilities"]["resources"].is_null());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let temp_dir = TempDir::new().unwrap();
        let response = rpc(
            test_app(&temp_dir),
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        )
        .await;

        assert_eq!(response["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_tools_call_denies_chained_command() {
        let temp_dir = TempDir::new().unwrap();
        let response = rpc(
            test_app(&temp_dir),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {
                    "name": "check_permission",
                    "arguments": {
                        "tool_name": "bash",
                        "params": { "command": "ls && rm -rf ~" }
                    }
                }
            }),
        )
        .await;

        let decision = &response["result"]["structuredContent"];
        assert_eq!(decision["allowed"], false);
        assert_eq!(decision["error_kind"], "shell_injection_detected");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let temp_dir = TempDir::new().unwrap();
        let response = rpc(
            test_app(&temp_dir),
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": { "name": "format_disk", "arguments": {} }
            }),
        )
        .await;

        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_version() {
        let temp_dir = TempDir::new().unwrap();
        let app = test_app(&temp_dir);

        let response = rpc(
            app.clone(),
            json!({ "jsonrpc": "2.0", "id": 5, "method": "resources/list" }),
        )
        .await;
        assert_eq!(response["error"]["code"], -32601);

        let response = rpc(app, json!({ "jsonrpc": "1.0", "id": 6, "method": "ping" })).await;
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = test_app(&temp_dir).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
