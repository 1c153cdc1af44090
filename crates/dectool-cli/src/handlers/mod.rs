//! Command handlers.
//!
//! Handlers follow one pattern:
//! `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`.
//! They parse CLI-specific input, call the catalog, stores or tool manager
//! and format the outcome for the terminal.

pub mod call;
pub mod discover;
pub mod paths;
pub mod results;
pub mod servers;
pub mod tools;

use dectool_core::domain::ServerConfig;
use dectool_core::ports::CatalogError;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Look a server up by id, then by name.
pub async fn resolve_server(ctx: &CliContext, identifier: &str) -> Result<ServerConfig, CliError> {
    match ctx.repos.catalog.get_by_id(identifier).await {
        Ok(server) => Ok(server),
        Err(CatalogError::NotFound(_)) => Ok(ctx.repos.catalog.get_by_name(identifier).await?),
        Err(e) => Err(e.into()),
    }
}

/// Split `KEY=VALUE`. The key must be non-empty; the value may be empty.
pub fn parse_pair(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::Arguments(format!("expected KEY=VALUE, got '{raw}'"))),
    }
}
