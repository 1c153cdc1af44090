//! JSON-RPC 2.0 message types and MCP payload shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use dectool_core::domain::{ResultValue, ToolDescriptor};

use super::{McpClientError, ToolOutcome};

/// JSON-RPC 2.0 request.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub const fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 notification (no id, no response).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> JsonRpcNotification<'a> {
    pub fn new(method: &'a str) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params: json!({}),
        }
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    /// Present on server-initiated requests and notifications.
    #[serde(default)]
    pub method: Option<String>,
}

impl JsonRpcResponse {
    /// Whether this message answers request `id`.
    pub fn answers(&self, id: u64) -> bool {
        self.method.is_none() && self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }

    /// Unwrap the `result`, turning an `error` member into a server error.
    pub fn into_result(self) -> Result<Value, McpClientError> {
        if let Some(err) = self.error {
            return Err(McpClientError::Server {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }
        self.result
            .ok_or_else(|| McpClientError::Protocol("Missing result in response".to_string()))
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// `initialize` request params.
pub fn initialize_params(protocol_version: &str, client_name: &str) -> Value {
    json!({
        "protocolVersion": protocol_version,
        "capabilities": {},
        "clientInfo": {
            "name": client_name,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// MCP initialize result. Only the fields this client reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeResult {
    #[serde(default, rename = "protocolVersion")]
    pub protocol_version: Option<String>,
    #[serde(default, rename = "serverInfo")]
    pub server_info: Option<ServerInfo>,
}

/// Server information from initialize.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// One page of `tools/list`.
#[derive(Debug, Deserialize)]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<ToolSchema>,
    #[serde(default, rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// MCP tool from tools/list.
#[derive(Debug, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Option<Value>,
}

impl ToolSchema {
    /// Normalize into a descriptor labelled with the reporting server.
    pub fn into_descriptor(self, server: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name,
            description: self.description.filter(|d| !d.trim().is_empty()),
            input_schema: self.input_schema,
            server: Some(server.to_string()),
        }
    }
}

/// `tools/call` request params.
pub fn call_params(name: &str, arguments: &Map<String, Value>) -> Value {
    json!({
        "name": name,
        "arguments": arguments
    })
}

/// Interpret a `tools/call` result.
///
/// `isError: true` is a failed call whose message is the first text item.
pub fn parse_call_result(result: &Value) -> ToolOutcome {
    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if is_error {
        let message = result
            .get("content")
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .find_map(|item| item.get("text").and_then(Value::as_str))
            })
            .unwrap_or("Unknown error")
            .to_string();
        return ToolOutcome::Failed(message);
    }

    ToolOutcome::Success(ResultValue::from_call_result(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(7, "tools/list", json!({}));
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/list","params":{}}"#
        );
    }

    #[test]
    fn test_notification_has_no_id() {
        let json =
            serde_json::to_value(JsonRpcNotification::new("notifications/initialized")).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["method"], "notifications/initialized");
    }

    #[test]
    fn test_response_answers_matching_id_only() {
        let response: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":{}}"#).unwrap();
        assert!(response.answers(3));
        assert!(!response.answers(4));

        let notification: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/progress","params":{}}"#,
        )
        .unwrap();
        assert!(!notification.answers(3));
    }

    #[test]
    fn test_error_member_surfaces_payload() {
        let response: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Unknown tool","data":{"tool":"x"}}}"#,
        )
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert!(matches!(
            err,
            McpClientError::Server { code: -32602, ref message, data: Some(_) } if message == "Unknown tool"
        ));
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[test]
    fn test_tool_schema_normalization() {
        let page: ToolsListResult = serde_json::from_value(json!({
            "tools": [
                {"name": "search", "description": "", "inputSchema": {"type": "object"}},
                {"name": "fetch"}
            ],
            "nextCursor": "page-2"
        }))
        .unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("page-2"));

        let descriptors: Vec<_> = page
            .tools
            .into_iter()
            .map(|t| t.into_descriptor("Research"))
            .collect();
        assert_eq!(descriptors[0].description, None);
        assert_eq!(descriptors[0].server.as_deref(), Some("Research"));
        assert!(descriptors[1].input_schema.is_none());
    }

    #[test]
    fn test_call_result_error_uses_first_text() {
        let outcome = parse_call_result(&json!({
            "content": [{"type": "text", "text": "rate limited"}],
            "isError": true
        }));
        assert_eq!(outcome, ToolOutcome::Failed("rate limited".to_string()));
    }

    #[test]
    fn test_call_result_success() {
        let outcome = parse_call_result(&json!({
            "content": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]
        }));
        assert_eq!(
            outcome,
            ToolOutcome::Success(ResultValue::TextItems(vec!["a".into(), "b".into()]))
        );
    }
}
