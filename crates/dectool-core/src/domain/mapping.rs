//! Context-argument mapping inference.
//!
//! Guesses which generation-context field should feed each argument of a newly
//! discovered tool, from the property names in its JSON input schema.
//!
//! The table is matched in order and a property maps to the first group that
//! matches, either exactly or as a `_<pattern>` suffix (`user_query` matches
//! `query`). Ambiguous names such as `input` or `name` are mapped as the table
//! says even when the property is not free text; mappings stay user-editable.

use std::collections::BTreeMap;

use serde_json::Value;

/// Ordered (patterns, context field) table.
const MAPPING_TABLE: &[(&[&str], &str)] = &[
    (&["query", "search_query", "search", "q"], "query"),
    (&["text", "content", "input"], "context"),
    (&["title", "name"], "title"),
    (&["topic", "subject", "problem"], "problem_statement"),
];

/// Infer `argument name -> context field` mappings from an input schema.
///
/// Properties with no table match fall back to `query` when they are
/// required strings whose description mentions "search" or "query".
pub fn infer_context_mappings(schema: &Value) -> BTreeMap<String, String> {
    let mut mappings = BTreeMap::new();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return mappings;
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (name, property) in properties {
        if let Some(field) = match_pattern(name) {
            mappings.insert(name.clone(), field.to_string());
            continue;
        }

        if required.contains(&name.as_str()) && is_string_property(property) {
            let description = property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            if description.contains("search") || description.contains("query") {
                mappings.insert(name.clone(), "query".to_string());
            }
        }
    }

    mappings
}

fn match_pattern(property_name: &str) -> Option<&'static str> {
    let lower = property_name.to_lowercase();
    MAPPING_TABLE.iter().find_map(|(patterns, field)| {
        patterns
            .iter()
            .any(|pattern| lower == *pattern || lower.ends_with(&format!("_{pattern}")))
            .then_some(*field)
    })
}

fn is_string_property(property: &Value) -> bool {
    match property.get("type") {
        Some(Value::String(kind)) => kind == "string",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("string")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(properties: Value, required: &[&str]) -> Value {
        json!({"type": "object", "properties": properties, "required": required})
    }

    #[test]
    fn test_exact_matches() {
        let mappings = infer_context_mappings(&schema(
            json!({
                "q": {"type": "string"},
                "content": {"type": "string"},
                "title": {"type": "string"},
                "topic": {"type": "string"},
                "limit": {"type": "integer"}
            }),
            &[],
        ));

        assert_eq!(mappings.get("q").map(String::as_str), Some("query"));
        assert_eq!(mappings.get("content").map(String::as_str), Some("context"));
        assert_eq!(mappings.get("title").map(String::as_str), Some("title"));
        assert_eq!(mappings.get("topic").map(String::as_str), Some("problem_statement"));
        assert!(!mappings.contains_key("limit"));
    }

    #[test]
    fn test_matching_is_case_insensitive_and_accepts_suffix() {
        let mappings = infer_context_mappings(&schema(
            json!({
                "User_Query": {"type": "string"},
                "page_title": {"type": "string"},
                "research_subject": {"type": "string"}
            }),
            &[],
        ));

        assert_eq!(mappings.get("User_Query").map(String::as_str), Some("query"));
        assert_eq!(mappings.get("page_title").map(String::as_str), Some("title"));
        assert_eq!(
            mappings.get("research_subject").map(String::as_str),
            Some("problem_statement")
        );
    }

    #[test]
    fn test_suffix_without_underscore_does_not_match() {
        let mappings = infer_context_mappings(&schema(json!({"subquery": {"type": "string"}}), &[]));
        assert!(mappings.is_empty());
    }

    #[test]
    fn test_earlier_group_wins() {
        // "search_query" is listed in the query group and also ends with "_query".
        let mappings =
            infer_context_mappings(&schema(json!({"search_query": {"type": "string"}}), &[]));
        assert_eq!(mappings.get("search_query").map(String::as_str), Some("query"));
    }

    #[test]
    fn test_required_string_description_fallback() {
        let mappings = infer_context_mappings(&schema(
            json!({
                "keywords": {"type": "string", "description": "Terms to Search for"},
                "filter": {"type": "string", "description": "Search filter"},
                "terms": {"type": "integer", "description": "query count"}
            }),
            &["keywords", "terms"],
        ));

        assert_eq!(mappings.get("keywords").map(String::as_str), Some("query"));
        // Not required.
        assert!(!mappings.contains_key("filter"));
        // Not a string.
        assert!(!mappings.contains_key("terms"));
    }

    #[test]
    fn test_schema_without_properties() {
        assert!(infer_context_mappings(&json!({"type": "object"})).is_empty());
        assert!(infer_context_mappings(&Value::Null).is_empty());
    }
}
