//! Stored result handlers.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

pub async fn list(ctx: &CliContext, owner: Option<&str>) -> Result<(), CliError> {
    let results = ctx.repos.results.list(owner).await?;
    if results.is_empty() {
        println!("No stored tool results.");
        return Ok(());
    }

    println!(
        "{:<36} {:<20} {:<20} {:<20} Owner",
        "ID", "Created", "Server", "Tool"
    );
    print_separator(120);
    for result in &results {
        println!(
            "{:<36} {:<20} {:<20} {:<20} {}",
            result.id,
            result.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate_string(&result.server_name, 20),
            truncate_string(&result.tool_name, 20),
            result.owner_id.as_deref().unwrap_or("--")
        );
    }
    Ok(())
}

pub async fn show(ctx: &CliContext, id: &str) -> Result<(), CliError> {
    let result = ctx.repos.results.get(id).await?;

    println!("ID:        {}", result.id);
    println!("Created:   {}", result.created_at.to_rfc3339());
    println!("Server:    {} ({})", result.server_name, result.server_id);
    println!("Tool:      {}", result.tool_name);
    if let Some(owner) = &result.owner_id {
        println!("Owner:     {owner}");
    }
    println!(
        "Arguments: {}",
        serde_json::to_string(&result.arguments).unwrap_or_default()
    );
    if let Some(error) = &result.error {
        println!("Error:     {error}");
    }
    if let Some(value) = &result.result {
        println!();
        println!("{}", value.flatten());
    }
    Ok(())
}

pub async fn delete(ctx: &CliContext, id: &str) -> Result<(), CliError> {
    ctx.repos.results.delete(id).await?;
    println!("Deleted result {id}");
    Ok(())
}

pub async fn purge(ctx: &CliContext, owner: &str) -> Result<(), CliError> {
    let removed = ctx.repos.results.delete_by_owner(owner).await?;
    println!("Deleted {removed} result(s) owned by {owner}");
    Ok(())
}
