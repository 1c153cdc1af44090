//! Prompt-ready context block.

use dectool_core::domain::ToolCallResult;

/// One paragraph per successful result, `[<server>/<tool>]` followed by the
/// flattened value, separated by blank lines. Failed results are left out.
pub fn format_context(results: &[ToolCallResult]) -> String {
    results
        .iter()
        .filter(|r| r.success)
        .map(|r| {
            let header = format!("[{}/{}]", r.server_name, r.tool_name);
            match r.value.as_ref().map(|v| v.flatten()) {
                Some(body) if !body.is_empty() => format!("{header}\n{body}"),
                _ => header,
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
