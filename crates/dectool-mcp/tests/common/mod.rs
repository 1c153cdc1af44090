//! In-process MCP server speaking the streamable HTTP flavour of the protocol.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const SESSION_ID: &str = "session-abc";

/// What the fake server saw.
#[derive(Default)]
pub struct Recorded {
    pub methods: Vec<String>,
    pub headers: Vec<HeaderMap>,
    /// JSON-RPC `id` of each POST, `None` for notifications.
    pub ids: Vec<Option<Value>>,
    pub deleted_sessions: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeMcpServer {
    pub recorded: Arc<Mutex<Recorded>>,
    /// Answer `initialize` without an `mcp-session-id` header.
    pub omit_session: bool,
}

impl FakeMcpServer {
    /// Serve on an ephemeral port and return the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/mcp", post(handle_post).delete(handle_delete))
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub fn methods(&self) -> Vec<String> {
        self.recorded.lock().unwrap().methods.clone()
    }

    pub fn ids(&self) -> Vec<Option<Value>> {
        self.recorded.lock().unwrap().ids.clone()
    }

    pub fn deleted_sessions(&self) -> Vec<String> {
        self.recorded.lock().unwrap().deleted_sessions.clone()
    }

    /// Values of `name` across every POST, in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<Option<String>> {
        self.recorded
            .lock()
            .unwrap()
            .headers
            .iter()
            .map(|h| h.get(name).and_then(|v| v.to_str().ok()).map(str::to_string))
            .collect()
    }
}

pub fn search_tool_list() -> Value {
    json!({
        "tools": [{
            "name": "search",
            "description": "Search the web",
            "inputSchema": {
                "type": "object",
                "properties": {"query": {"type": "string", "description": "Search terms"}},
                "required": ["query"]
            }
        }]
    })
}

async fn handle_post(
    State(server): State<FakeMcpServer>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    {
        let mut recorded = server.recorded.lock().unwrap();
        recorded.methods.push(method.clone());
        recorded.headers.push(headers.clone());
        recorded.ids.push(body.get("id").cloned());
    }
    let id = body.get("id").cloned().unwrap_or(Value::Null);

    let session = headers.get("mcp-session-id").and_then(|v| v.to_str().ok());
    if method != "initialize" && session != Some(SESSION_ID) {
        return (StatusCode::BAD_REQUEST, "missing or unknown session").into_response();
    }

    match method.as_str() {
        "initialize" => {
            let reply = Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": "fake-mcp", "version": "1.0.0"}
                }
            }));
            if server.omit_session {
                reply.into_response()
            } else {
                ([("mcp-session-id", SESSION_ID)], reply).into_response()
            }
        }
        "notifications/initialized" => StatusCode::ACCEPTED.into_response(),
        "tools/list" => {
            let payload = json!({"jsonrpc": "2.0", "id": id, "result": search_tool_list()});
            (
                [(header::CONTENT_TYPE, "text/event-stream")],
                format!("event: message\ndata: {payload}\n\n"),
            )
                .into_response()
        }
        "tools/call" => Json(call_reply(id, &body["params"])).into_response(),
        _ => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": "Method not found"}
        }))
        .into_response(),
    }
}

fn call_reply(id: Value, params: &Value) -> Value {
    let query = params["arguments"]["query"].as_str().unwrap_or_default();
    match params["name"].as_str() {
        Some("search") => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {"content": [{"type": "text", "text": format!("Results for {query}")}]}
        }),
        Some("fail") => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {"content": [{"type": "text", "text": "quota exceeded"}], "isError": true}
        }),
        other => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32602, "message": format!("Unknown tool: {}", other.unwrap_or_default())}
        }),
    }
}

async fn handle_delete(State(server): State<FakeMcpServer>, headers: HeaderMap) -> StatusCode {
    if let Some(session) = headers.get("mcp-session-id").and_then(|v| v.to_str().ok()) {
        server
            .recorded
            .lock()
            .unwrap()
            .deleted_sessions
            .push(session.to_string());
    }
    StatusCode::OK
}
