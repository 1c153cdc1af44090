//! MCP JSON-RPC client for communicating with tool servers.
//!
//! Two transports implement [`McpTransport`]:
//!
//! - [`StdioTransport`]: newline-delimited JSON-RPC over a child process's
//!   stdin/stdout
//! - [`HttpTransport`]: JSON-RPC POSTs to a single `/mcp` endpoint with a
//!   session token header; responses are JSON or a single SSE event
//!
//! Reference: <https://spec.modelcontextprotocol.io/>

mod http;
pub(crate) mod jsonrpc;
mod stdio;

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use thiserror::Error;

use dectool_core::domain::{ResultValue, ToolDescriptor};
use dectool_core::ports::ToolServiceError;

pub use http::{HttpTransport, SESSION_HEADER, mcp_endpoint};
pub use stdio::StdioTransport;

use jsonrpc::{ToolsListResult, call_params, parse_call_result};

/// Upper bound on `tools/list` pages followed through `nextCursor`.
const MAX_TOOL_PAGES: usize = 50;

/// Errors that can occur during MCP client operations.
#[derive(Debug, Error)]
pub enum McpClientError {
    #[error("Failed to spawn tool server process: {0}")]
    Spawn(String),

    #[error("Failed to communicate with tool server: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("MCP protocol error: {0}")]
    Protocol(String),

    #[error("Server did not return an mcp-session-id header")]
    MissingSessionId,

    #[error("Timeout waiting for tool server response")]
    Timeout,

    #[error("Tool server closed the connection")]
    Closed,

    #[error("{}", format_server_error(*code, message, data.as_ref()))]
    Server {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Session is {0}, expected active")]
    InvalidState(SessionState),
}

fn format_server_error(code: i64, message: &str, data: Option<&Value>) -> String {
    match data {
        Some(data) => format!("Tool server returned error {code}: {message} ({data})"),
        None => format!("Tool server returned error {code}: {message}"),
    }
}

impl From<McpClientError> for ToolServiceError {
    fn from(err: McpClientError) -> Self {
        Self::Protocol(err.to_string())
    }
}

/// Lifecycle of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    Active,
    Terminated,
}

impl SessionState {
    /// Fail fast unless the session is active.
    pub const fn require_active(self) -> Result<(), McpClientError> {
        match self {
            Self::Active => Ok(()),
            other => Err(McpClientError::InvalidState(other)),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// What the handshake established.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHandle {
    /// Token from the `mcp-session-id` header (HTTP only).
    pub session_id: Option<String>,
    /// Protocol revision the server answered with.
    pub protocol_version: Option<String>,
    /// `serverInfo.name` reported by the server.
    pub server_name: Option<String>,
}

/// Result of a `tools/call` that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(ResultValue),
    /// The tool ran and reported `isError: true`.
    Failed(String),
}

/// One session with one tool server.
///
/// Sessions are owned by a single caller, opened with `initialize()`, and
/// must be closed with `terminate()` on every exit path. Dropping an open
/// session releases it as well (the stdio child is killed on drop).
#[async_trait]
pub trait McpTransport: Send {
    /// Perform the MCP handshake. Moves the session to `Active`.
    async fn initialize(&mut self) -> Result<SessionHandle, McpClientError>;

    /// Send one JSON-RPC request and return its `result`.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpClientError>;

    /// Close the session. Best-effort: failures are logged, never returned.
    async fn terminate(&mut self);

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Catalog name of the server, used to label discovered tools.
    fn server_label(&self) -> &str;

    /// List every tool the server exposes, following pagination.
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, McpClientError> {
        self.state().require_active()?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor
                .as_ref()
                .map_or_else(|| json!({}), |c| json!({ "cursor": c }));
            let page: ToolsListResult =
                serde_json::from_value(self.request("tools/list", params).await?)?;

            let label = self.server_label().to_string();
            tools.extend(page.tools.into_iter().map(|t| t.into_descriptor(&label)));

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(tools),
            }
        }

        tracing::warn!(
            server_name = %self.server_label(),
            pages = MAX_TOOL_PAGES,
            "Stopped following tools/list pagination"
        );
        Ok(tools)
    }

    /// Invoke one tool.
    async fn call_tool(
        &mut self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<ToolOutcome, McpClientError> {
        self.state().require_active()?;
        let result = self.request("tools/call", call_params(name, arguments)).await?;
        Ok(parse_call_result(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_active() {
        assert!(SessionState::Active.require_active().is_ok());
        for state in [
            SessionState::Uninitialized,
            SessionState::Initializing,
            SessionState::Terminated,
        ] {
            assert!(matches!(
                state.require_active(),
                Err(McpClientError::InvalidState(s)) if s == state
            ));
        }
    }

    #[test]
    fn test_server_error_display_includes_data() {
        let err = McpClientError::Server {
            code: -32000,
            message: "quota exceeded".to_string(),
            data: Some(json!({"retry_after": 30})),
        };
        let text = err.to_string();
        assert!(text.contains("-32000"));
        assert!(text.contains("quota exceeded"));
        assert!(text.contains("retry_after"));
    }

    #[test]
    fn test_client_error_maps_to_protocol_error() {
        let err: ToolServiceError = McpClientError::MissingSessionId.into();
        assert!(matches!(err, ToolServiceError::Protocol(msg) if msg.contains("mcp-session-id")));
    }
}
