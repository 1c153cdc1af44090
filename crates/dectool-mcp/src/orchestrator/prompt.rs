//! Tool selection prompt.

use std::fmt::Write as _;

use serde_json::Value;

use super::OfferedTool;

/// Render the selection prompt for the offered tools.
pub fn build_selection_prompt(
    title: &str,
    problem_statement: &str,
    context: &str,
    tools: &[OfferedTool],
) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are helping analyse a decision. Choose which of the available tools, if any, \
         would gather information that improves the analysis.\n\n",
    );
    let _ = writeln!(prompt, "Decision title: {title}");
    let _ = writeln!(prompt, "Problem statement: {problem_statement}");
    if !context.trim().is_empty() {
        let _ = writeln!(prompt, "Context: {context}");
    }

    prompt.push_str("\nAvailable tools:\n");
    for tool in tools {
        render_tool(&mut prompt, tool);
    }

    prompt.push_str(
        "\nRespond with strict JSON only, in exactly this shape:\n\
         {\"reasoning\": \"<why these tools>\", \"tool_calls\": [{\"tool_name\": \"<name>\", \"arguments\": {}}]}\n\
         Use an empty tool_calls list when no tool helps. Only use tool names listed above.\n",
    );
    prompt
}

fn render_tool(out: &mut String, tool: &OfferedTool) {
    let _ = writeln!(out, "- {} (server: {})", tool.name, tool.server_name);
    if let Some(description) = tool.description.as_deref() {
        let _ = writeln!(out, "  Description: {description}");
    }
    match tool.input_schema.as_ref() {
        None => out.push_str("  Arguments: unknown (schema unavailable)\n"),
        Some(schema) => {
            let arguments = describe_arguments(schema);
            if arguments.is_empty() {
                out.push_str("  Arguments: none\n");
            } else {
                out.push_str("  Arguments:\n");
                for line in arguments {
                    let _ = writeln!(out, "    - {line}");
                }
            }
        }
    }
}

/// `name: type[, required][ - description]` per schema property.
fn describe_arguments(schema: &Value) -> Vec<String> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| {
            let mut line = format!("{name}: {}", type_name(property));
            if required.contains(&name.as_str()) {
                line.push_str(", required");
            }
            if let Some(description) = property.get("description").and_then(Value::as_str) {
                let _ = write!(line, " - {description}");
            }
            line
        })
        .collect()
}

fn type_name(property: &Value) -> String {
    match property.get("type") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" | "),
        _ => "any".to_string(),
    }
}
