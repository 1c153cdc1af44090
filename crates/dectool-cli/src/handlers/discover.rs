//! Discover command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::resolve_server;
use crate::presentation::truncate_string;

/// Connect to the server, list its tools and merge them into the catalog.
pub async fn execute(ctx: &CliContext, identifier: &str) -> Result<(), CliError> {
    let server = resolve_server(ctx, identifier).await?;
    let tools = ctx.manager.discover_tools(&server.id).await?;

    if tools.is_empty() {
        println!("Server '{}' reported no tools.", server.name);
        return Ok(());
    }

    println!("Discovered {} tool(s) on '{}':", tools.len(), server.name);
    for tool in &tools {
        println!(
            "  - {:<24} {}",
            truncate_string(&tool.name, 24),
            truncate_string(tool.description.as_deref().unwrap_or_default(), 70)
        );
    }
    Ok(())
}
