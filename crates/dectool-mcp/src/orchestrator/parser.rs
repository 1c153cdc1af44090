//! Parsing of the model's tool selection.

use serde::Deserialize;
use serde_json::{Map, Value};

use dectool_core::domain::{ToolCall, ToolSelectionResult};

#[derive(Debug, Deserialize)]
struct RawSelection {
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<RawCall>>,
}

#[derive(Debug, Deserialize)]
struct RawCall {
    #[serde(alias = "name")]
    tool_name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Parse the JSON object spanning the first `{` to the last `}` of `output`.
///
/// Calls are returned without a resolved server. The error is a short
/// human-readable detail.
pub fn parse_selection(output: &str) -> Result<ToolSelectionResult, String> {
    let (Some(start), Some(end)) = (output.find('{'), output.rfind('}')) else {
        return Err("no JSON object in model output".to_string());
    };
    if end < start {
        return Err("no JSON object in model output".to_string());
    }

    let raw: RawSelection =
        serde_json::from_str(&output[start..=end]).map_err(|e| e.to_string())?;

    let mut tool_calls = Vec::new();
    for call in raw.tool_calls.unwrap_or_default() {
        let arguments = match call.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(format!(
                    "arguments for '{}' must be a JSON object",
                    call.tool_name
                ));
            }
        };
        tool_calls.push(ToolCall::new(call.tool_name, arguments));
    }

    Ok(ToolSelectionResult {
        reasoning: raw.reasoning.unwrap_or_default(),
        tool_calls,
    })
}
