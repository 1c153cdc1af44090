//! Citation summaries for successful tool results.

use serde_json::{Map, Value};

/// Maximum characters kept from a summary before the `...` marker.
pub const SUMMARY_MAX_CHARS: usize = 80;

const QUERY_KEYS: [&str; 3] = ["query", "search_query", "q"];
const URL_KEYS: [&str; 2] = ["url", "uri"];

/// One-line description of what a call asked for.
///
/// First match wins: a query argument as `Query: "<value>"`, a URL argument
/// as `URL: <value>`, a truncated JSON dump of the arguments, `Tool: <name>`.
pub fn summarize(arguments: &Map<String, Value>, tool_name: &str) -> String {
    if let Some(query) = first_present(arguments, &QUERY_KEYS) {
        let rendered = format!("Query: \"{query}\"");
        if rendered.chars().count() <= SUMMARY_MAX_CHARS {
            return rendered;
        }
        let cut: String = rendered.chars().take(SUMMARY_MAX_CHARS).collect();
        return format!("{cut}...\"");
    }
    if let Some(url) = first_present(arguments, &URL_KEYS) {
        return format!("URL: {url}");
    }
    if !arguments.is_empty() {
        let dump = serde_json::to_string(arguments).unwrap_or_default();
        if !dump.is_empty() {
            return truncate(&dump, SUMMARY_MAX_CHARS);
        }
    }
    format!("Tool: {tool_name}")
}

fn first_present(arguments: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match arguments.get(*key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

/// Cut `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}
