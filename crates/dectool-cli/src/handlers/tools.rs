//! Tool configuration handlers.

use serde_json::Value;

use dectool_core::domain::{ExecutionMode, UpdateToolConfig};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::servers::mode_label;
use crate::handlers::{parse_pair, resolve_server};
use crate::presentation::{print_separator, truncate_string};

/// Arguments for `tools set`.
#[derive(Default)]
pub struct SetToolArgs {
    pub server: String,
    pub tool: String,
    pub enabled: Option<bool>,
    pub mode: Option<ExecutionMode>,
    /// `ARG=FIELD` pairs merged into the existing mappings.
    pub mappings: Vec<String>,
    /// `KEY=JSON` pairs merged into the existing defaults.
    pub defaults: Vec<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

pub async fn list(ctx: &CliContext, identifier: &str) -> Result<(), CliError> {
    let server = resolve_server(ctx, identifier).await?;
    if server.tools.is_empty() {
        println!("Server '{}' has no configured tools.", server.name);
        println!("Run 'dectool discover {}' to fetch them.", server.name);
        return Ok(());
    }

    println!(
        "{:<24} {:<13} {:<8} {:<28} Description",
        "Tool", "Mode", "Default", "Mappings"
    );
    print_separator(110);
    for tool in &server.tools {
        let mappings = tool
            .context_argument_mappings
            .iter()
            .map(|(arg, field)| format!("{arg}<-{field}"))
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<24} {:<13} {:<8} {:<28} {}",
            truncate_string(tool.label(), 24),
            mode_label(tool.execution_mode),
            if tool.default_enabled { "on" } else { "off" },
            truncate_string(&mappings, 28),
            truncate_string(tool.description.as_deref().unwrap_or_default(), 40)
        );
    }
    Ok(())
}

pub async fn set(ctx: &CliContext, args: SetToolArgs) -> Result<(), CliError> {
    let server = resolve_server(ctx, &args.server).await?;
    let current = server.tool(&args.tool).ok_or_else(|| {
        CliError::NotFound(format!(
            "tool '{}' on server '{}' (run 'dectool discover {}' first)",
            args.tool, server.name, server.name
        ))
    })?;

    let mut update = UpdateToolConfig {
        display_name: args.display_name,
        description: args.description,
        execution_mode: args.mode,
        default_enabled: args.enabled,
        ..UpdateToolConfig::default()
    };

    if !args.mappings.is_empty() {
        let mut mappings = current.context_argument_mappings.clone();
        for raw in &args.mappings {
            let (arg, field) = parse_pair(raw)?;
            if field.trim().is_empty() {
                return Err(CliError::Arguments(format!("empty context field in '{raw}'")));
            }
            mappings.insert(arg, field);
        }
        update.context_argument_mappings = Some(mappings);
    }

    if !args.defaults.is_empty() {
        let mut defaults = current.default_arguments.clone();
        for raw in &args.defaults {
            let (key, json) = parse_pair(raw)?;
            let value: Value = serde_json::from_str(&json).map_err(|e| {
                CliError::Arguments(format!("default for '{key}' is not valid JSON: {e}"))
            })?;
            defaults.insert(key, value);
        }
        update.default_arguments = Some(defaults);
    }

    let updated = ctx
        .repos
        .catalog
        .update_tool(&server.id, &args.tool, update)
        .await?;
    tracing::debug!(server_id = %server.id, tool_name = %updated.tool_name, "Tool updated");
    println!("Updated tool '{}' on '{}'", updated.label(), server.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::context;
    use dectool_core::domain::{NewServerConfig, ToolConfig};
    use serde_json::json;

    #[tokio::test]
    async fn test_set_merges_mappings_and_defaults() {
        let (_tmp, ctx) = context();
        let mut search = ToolConfig::new("search");
        search
            .context_argument_mappings
            .insert("query".to_string(), "query".to_string());
        let server = ctx
            .repos
            .catalog
            .insert(NewServerConfig::new_http("web", "http://localhost:1").with_tool(search))
            .await
            .unwrap();

        set(
            &ctx,
            SetToolArgs {
                server: "web".to_string(),
                tool: "search".to_string(),
                mode: Some(ExecutionMode::PerPersona),
                mappings: vec!["topic=title".to_string()],
                defaults: vec!["limit=5".to_string(), r#"filters={"lang":"en"}"#.to_string()],
                ..SetToolArgs::default()
            },
        )
        .await
        .unwrap();

        let stored = ctx.repos.catalog.get_by_id(&server.id).await.unwrap();
        let tool = stored.tool("search").unwrap();
        assert_eq!(tool.execution_mode, ExecutionMode::PerPersona);
        assert_eq!(tool.context_argument_mappings.len(), 2);
        assert_eq!(tool.default_arguments["limit"], json!(5));
        assert_eq!(tool.default_arguments["filters"], json!({"lang": "en"}));
    }

    #[tokio::test]
    async fn test_set_rejects_bad_json_and_unknown_tool() {
        let (_tmp, ctx) = context();
        ctx.repos
            .catalog
            .insert(
                NewServerConfig::new_http("web", "http://localhost:1")
                    .with_tool(ToolConfig::new("search")),
            )
            .await
            .unwrap();

        let err = set(
            &ctx,
            SetToolArgs {
                server: "web".to_string(),
                tool: "search".to_string(),
                defaults: vec!["limit=five".to_string()],
                ..SetToolArgs::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));

        let err = set(
            &ctx,
            SetToolArgs {
                server: "web".to_string(),
                tool: "fetch".to_string(),
                ..SetToolArgs::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));
    }
}
