//! Call argument resolution.

use serde_json::{Map, Value};

use dectool_core::domain::{GenerationContext, ToolConfig};

/// Build the arguments for one call from three layers, later layers winning:
///
/// 1. the tool's `default_arguments`
/// 2. context mappings, for mapped fields present in `context`
/// 3. `user_args`
pub fn build_tool_arguments(
    tool: &ToolConfig,
    context: &GenerationContext,
    user_args: &Map<String, Value>,
) -> Map<String, Value> {
    let mut args = tool.default_arguments.clone();

    for (arg_name, field) in &tool.context_argument_mappings {
        if let Some(value) = context.get(field) {
            args.insert(arg_name.clone(), Value::String(value.to_string()));
        }
    }

    for (key, value) in user_args {
        args.insert(key.clone(), value.clone());
    }

    args
}
