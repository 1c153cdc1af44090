//! Call command handler.

use serde_json::{Map, Value};

use dectool_core::domain::{GenerationContext, StoredToolResult};
use dectool_mcp::build_tool_arguments;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::resolve_server;

/// Arguments for `call`.
pub struct CallArgs {
    pub server: String,
    pub tool: String,
    /// JSON object text.
    pub args: String,
    pub owner: Option<String>,
}

/// Call one tool. Configured default arguments apply; `--args` wins.
///
/// A successful result is stored and its id printed. A failed call is
/// reported as an error.
pub async fn execute(ctx: &CliContext, args: CallArgs) -> Result<(), CliError> {
    let user_args = parse_arguments(&args.args)?;
    let server = resolve_server(ctx, &args.server).await?;

    let arguments = match server.tool(&args.tool) {
        Some(tool) => build_tool_arguments(tool, &GenerationContext::default(), &user_args),
        None => user_args,
    };

    let result = ctx
        .manager
        .call_tool_on(&server, &args.tool, arguments)
        .await;

    if !result.success {
        return Err(CliError::Tool(
            result.error.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }

    let stored = StoredToolResult::from_call(&result, args.owner.as_deref());
    ctx.repos.results.save(&stored).await?;

    if let Some(value) = &result.value {
        println!("{}", value.flatten());
    }
    println!();
    println!("Stored result {}", stored.id);
    Ok(())
}

fn parse_arguments(raw: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::Arguments("--args must be a JSON object".to_string())),
        Err(e) => Err(CliError::Arguments(format!("--args is not valid JSON: {e}"))),
    }
}
