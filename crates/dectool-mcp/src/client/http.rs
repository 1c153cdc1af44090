//! HTTP transport: JSON-RPC over POST to a single `/mcp` endpoint.
//!
//! The session token comes back in the `mcp-session-id` header of the
//! `initialize` response and is sent with every later request. A response is
//! either a JSON body or a single `text/event-stream` event whose first
//! `data:` line carries the JSON-RPC message.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use super::jsonrpc::{
    InitializeResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, initialize_params,
};
use super::{McpClientError, McpTransport, SessionHandle, SessionState};
use crate::config::{ClientOptions, HttpTransportConfig};

/// Session token header.
pub const SESSION_HEADER: &str = "mcp-session-id";

const ENDPOINT_PATH: &str = "/mcp";
const ACCEPT_VALUE: &str = "application/json, text/event-stream";
const BODY_EXCERPT_CHARS: usize = 200;

/// Endpoint for `base_url`: `/mcp` is appended unless already present.
pub fn mcp_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with(ENDPOINT_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{ENDPOINT_PATH}")
    }
}

/// Session with a remote tool server.
pub struct HttpTransport {
    server_name: String,
    endpoint: String,
    client: reqwest::Client,
    headers: HeaderMap,
    protocol_version: String,
    client_name: String,
    session_id: Option<String>,
    state: SessionState,
    next_id: u64,
}

impl HttpTransport {
    /// Build the transport. No request is sent until `initialize()`.
    pub fn new(config: HttpTransportConfig, options: &ClientOptions) -> Result<Self, McpClientError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| McpClientError::InvalidHeader(key.clone()))?;
            let mut value = HeaderValue::from_str(value)
                .map_err(|_| McpClientError::InvalidHeader(key.clone()))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self {
            server_name: config.server_name,
            endpoint: mcp_endpoint(&config.url),
            client,
            headers,
            protocol_version: options.protocol_version.clone(),
            client_name: options.client_name.clone(),
            session_id: None,
            state: SessionState::Uninitialized,
            next_id: 1,
        })
    }

    /// Token of the current session, if the handshake completed.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    async fn post<T: Serialize + Sync>(&self, body: &T) -> Result<reqwest::Response, McpClientError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(body);
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id);
        }
        Ok(request.send().await?)
    }

    /// Fire-and-forget notification. Failures are logged only.
    async fn notify(&self, method: &str) {
        match self.post(&JsonRpcNotification::new(method)).await {
            Ok(response) if !response.status().is_success() => {
                tracing::debug!(
                    server_name = %self.server_name,
                    method,
                    status = %response.status(),
                    "Notification rejected"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(server_name = %self.server_name, method, error = %e, "Notification failed");
            }
        }
    }

    async fn handshake(&mut self) -> Result<SessionHandle, McpClientError> {
        let id = self.take_id();
        let params = initialize_params(&self.protocol_version, &self.client_name);
        let response = self
            .post(&JsonRpcRequest::new(id, "initialize", params))
            .await?;

        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let result: InitializeResult =
            serde_json::from_value(read_message(response).await?.into_result()?)?;
        let session_id = session_id.ok_or(McpClientError::MissingSessionId)?;
        self.session_id = Some(session_id.clone());

        self.notify("notifications/initialized").await;

        Ok(SessionHandle {
            session_id: Some(session_id),
            protocol_version: result.protocol_version,
            server_name: result.server_info.map(|info| info.name),
        })
    }
}

/// Decode one JSON-RPC message from a JSON or SSE response.
async fn read_message(response: reqwest::Response) -> Result<JsonRpcResponse, McpClientError> {
    let status = response.status();
    let is_event_stream = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/event-stream"));
    let body = response.text().await?;

    if !status.is_success() {
        return Err(McpClientError::HttpStatus {
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }

    let payload = if is_event_stream {
        first_sse_data(&body).ok_or_else(|| {
            McpClientError::Protocol("Event stream contained no data payload".to_string())
        })?
    } else {
        body.as_str()
    };

    Ok(serde_json::from_str(payload)?)
}

/// Payload of the first `data:` line of an event stream.
fn first_sse_data(body: &str) -> Option<&str> {
    body.lines().find_map(|line| {
        line.strip_prefix("data:")
            .map(|rest| rest.strip_prefix(' ').unwrap_or(rest).trim_end())
    })
}

fn excerpt(body: &str) -> String {
    let mut out: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    if body.chars().count() > BODY_EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}

#[async_trait]
impl McpTransport for HttpTransport {
    async fn initialize(&mut self) -> Result<SessionHandle, McpClientError> {
        if self.state != SessionState::Uninitialized {
            return Err(McpClientError::InvalidState(self.state));
        }
        self.state = SessionState::Initializing;

        match self.handshake().await {
            Ok(handle) => {
                self.state = SessionState::Active;
                tracing::debug!(
                    server_name = %self.server_name,
                    endpoint = %self.endpoint,
                    remote = ?handle.server_name,
                    "HTTP session initialized"
                );
                Ok(handle)
            }
            Err(e) => {
                self.terminate().await;
                Err(e)
            }
        }
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpClientError> {
        self.state.require_active()?;
        let id = self.take_id();
        let response = self.post(&JsonRpcRequest::new(id, method, params)).await?;
        read_message(response).await?.into_result()
    }

    async fn terminate(&mut self) {
        self.state = SessionState::Terminated;
        let Some(session_id) = self.session_id.take() else {
            return;
        };

        let result = self
            .client
            .delete(&self.endpoint)
            .headers(self.headers.clone())
            .header(SESSION_HEADER, &session_id)
            .send()
            .await;
        match result {
            Ok(response) => {
                tracing::debug!(
                    server_name = %self.server_name,
                    status = %response.status(),
                    "Session terminated"
                );
            }
            Err(e) => {
                tracing::debug!(server_name = %self.server_name, error = %e, "Session DELETE failed");
            }
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn server_label(&self) -> &str {
        &self.server_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(url: &str, headers: &[(&str, &str)]) -> HttpTransportConfig {
        HttpTransportConfig {
            server_name: "Research".to_string(),
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<BTreeMap<_, _>>(),
            oauth: false,
        }
    }

    #[test]
    fn test_endpoint_appends_path_once() {
        assert_eq!(mcp_endpoint("http://localhost:8931"), "http://localhost:8931/mcp");
        assert_eq!(mcp_endpoint("http://localhost:8931/"), "http://localhost:8931/mcp");
        assert_eq!(mcp_endpoint("http://localhost:8931/mcp"), "http://localhost:8931/mcp");
        assert_eq!(mcp_endpoint("https://h/api/mcp/"), "https://h/api/mcp");
        assert_eq!(mcp_endpoint("https://h/api"), "https://h/api/mcp");
    }

    #[test]
    fn test_first_sse_data() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\ndata: {\"ignored\":true}\n\n";
        assert_eq!(
            first_sse_data(body),
            Some("{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}")
        );
        assert_eq!(first_sse_data("data:{}\r\n"), Some("{}"));
        assert_eq!(first_sse_data("event: ping\n\n"), None);
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(500);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), BODY_EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = HttpTransport::new(
            config("http://localhost", &[("Bad Header", "x")]),
            &ClientOptions::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, McpClientError::InvalidHeader(name) if name == "Bad Header"));
    }

    #[tokio::test]
    async fn test_request_before_initialize_fails_fast() {
        let mut transport =
            HttpTransport::new(config("http://localhost:9", &[]), &ClientOptions::default())
                .unwrap();
        let err = transport
            .call_tool("search", &serde_json::Map::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            McpClientError::InvalidState(SessionState::Uninitialized)
        ));
        assert!(transport.session_id().is_none());
    }
}
