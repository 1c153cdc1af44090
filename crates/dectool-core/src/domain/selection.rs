//! Transient values produced while selecting and citing tool calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One tool call chosen by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Owning server, resolved from the catalog after selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            server_id: None,
        }
    }
}

/// The model's reasoning plus the ordered calls it asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSelectionResult {
    pub reasoning: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ToolSelectionResult {
    /// A selection with no calls.
    pub fn empty(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// A short citation derived from a successful tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceInfo {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Always `"mcp"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub server_name: String,
}

impl ReferenceInfo {
    pub const KIND: &'static str = "mcp";

    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
        server_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
            kind: Self::KIND.to_string(),
            server_name: server_name.into(),
        }
    }
}

/// Fields of the generation context that tool arguments can be mapped from.
///
/// Well-known fields are `title`, `problem_statement`, `context` and `query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationContext(BTreeMap<String, String>);

impl GenerationContext {
    /// Build a context from the decision inputs. Empty fields are left out.
    pub fn new(title: &str, problem_statement: &str, context: &str) -> Self {
        let mut fields = Self::default();
        fields.set("title", title);
        fields.set("problem_statement", problem_statement);
        fields.set("context", context);
        fields
    }

    /// Set the `query` field.
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.set("query", query);
        self
    }

    /// Set a field; empty values are ignored.
    pub fn set(&mut self, field: &str, value: &str) {
        if !value.trim().is_empty() {
            self.0.insert(field.to_string(), value.to_string());
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}
