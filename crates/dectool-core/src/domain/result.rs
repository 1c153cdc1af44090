//! Tool call outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::catalog::new_id;

/// Outcome value of a successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResultValue {
    /// A list of content items, one string per item.
    TextItems(Vec<String>),
    /// Structured JSON (maps or lists).
    Structured(Value),
    /// Anything else, in its string form.
    Scalar(String),
}

impl ResultValue {
    /// Classify the `result` member of a `tools/call` response.
    ///
    /// A `content` array becomes `TextItems`; `structuredContent` without any
    /// content becomes `Structured`; other maps and lists are `Structured`.
    pub fn from_call_result(result: &Value) -> Self {
        let content = result.get("content").and_then(Value::as_array);

        if let Some(structured) = result.get("structuredContent") {
            if content.is_none_or(Vec::is_empty) {
                return Self::Structured(structured.clone());
            }
        }

        if let Some(items) = content {
            return Self::TextItems(items.iter().map(content_item_text).collect());
        }

        match result {
            Value::Object(_) | Value::Array(_) => Self::Structured(result.clone()),
            Value::String(s) => Self::Scalar(s.clone()),
            other => Self::Scalar(other.to_string()),
        }
    }

    /// Render for inclusion in a prompt.
    pub fn flatten(&self) -> String {
        match self {
            Self::TextItems(items) => items.join("\n"),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Scalar(text) => text.clone(),
        }
    }
}

/// Text of one MCP content item: its `text`, else its `data`, else its JSON.
fn content_item_text(item: &Value) -> String {
    if let Some(text) = item.get("text").and_then(Value::as_str) {
        return text.to_string();
    }
    match item.get("data") {
        Some(Value::String(data)) => data.clone(),
        Some(data) => data.to_string(),
        None => match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// In-memory outcome of one tool call.
///
/// Failures are data: transport and remote errors end up in `error` with
/// `success == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub server_id: String,
    pub server_name: String,
    pub tool_name: String,
    /// Arguments actually sent.
    pub arguments: Map<String, Value>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ResultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallResult {
    /// Create a success result.
    pub fn success(
        server_id: impl Into<String>,
        server_name: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
        value: ResultValue,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            arguments,
            success: true,
            value: Some(value),
            error: None,
        }
    }

    /// Create an error result. An empty message is replaced so that failed
    /// results always carry an error.
    pub fn failure(
        server_id: impl Into<String>,
        server_name: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Unknown error".to_string();
        }
        Self {
            server_id: server_id.into(),
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            arguments,
            success: false,
            value: None,
            error: Some(message),
        }
    }
}

/// Immutable persisted record of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToolResult {
    pub id: String,
    pub server_id: String,
    pub server_name: String,
    pub tool_name: String,
    pub arguments: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultValue>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Owning decision-record id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl StoredToolResult {
    /// Build a record for `outcome` with a fresh id and timestamp.
    pub fn from_call(outcome: &ToolCallResult, owner_id: Option<&str>) -> Self {
        Self {
            id: new_id(),
            server_id: outcome.server_id.clone(),
            server_name: outcome.server_name.clone(),
            tool_name: outcome.tool_name.clone(),
            arguments: outcome.arguments.clone(),
            result: outcome.value.clone(),
            success: outcome.success,
            error: outcome.error.clone(),
            created_at: Utc::now(),
            owner_id: owner_id.map(str::to_string),
        }
    }
}
