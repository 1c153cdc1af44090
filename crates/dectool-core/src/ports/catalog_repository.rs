//! Tool catalog repository trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewServerConfig, ServerConfig, ToolConfig, ToolDescriptor, UpdateToolConfig};

/// Domain-specific errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested server was not found.
    #[error("Tool server not found: {0}")]
    NotFound(String),

    /// The requested tool is not configured on the server.
    #[error("Tool '{tool}' not found on server {server}")]
    ToolNotFound { server: String, tool: String },

    /// A server with the same name already exists.
    #[error("Tool server already exists: {0}")]
    Conflict(String),

    /// Storage backend error.
    #[error("Catalog storage error: {0}")]
    Internal(String),
}

/// Repository trait for server and tool configuration.
///
/// # Design Rules
///
/// - Tool configs are embedded in `ServerConfig` - `update()` replaces both
/// - Constraint: unique server `name`
/// - Records are stored even when transport fields are incomplete
/// - `sync_tools()` never deletes tools or overwrites populated user fields
#[async_trait]
pub trait ToolCatalogRepository: Send + Sync {
    /// Insert a new server and return it with its generated ID.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a server with the same name already exists
    /// - `Internal` for storage errors
    async fn insert(&self, server: NewServerConfig) -> Result<ServerConfig, CatalogError>;

    /// Get a server by ID.
    async fn get_by_id(&self, id: &str) -> Result<ServerConfig, CatalogError>;

    /// Get a server by its unique name.
    async fn get_by_name(&self, name: &str) -> Result<ServerConfig, CatalogError>;

    /// List all servers in insertion order.
    async fn list(&self) -> Result<Vec<ServerConfig>, CatalogError>;

    /// Replace an existing server, including its tools.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no server with the given ID exists
    /// - `Conflict` if the new name conflicts with another server
    async fn update(&self, server: &ServerConfig) -> Result<(), CatalogError>;

    /// Delete a server by ID.
    async fn delete(&self, id: &str) -> Result<(), CatalogError>;

    /// Apply a partial update to one tool and return the updated config.
    async fn update_tool(
        &self,
        server_id: &str,
        tool_name: &str,
        update: UpdateToolConfig,
    ) -> Result<ToolConfig, CatalogError>;

    /// Merge discovered tools into the server's tool list.
    ///
    /// Unknown tools are inserted with inferred context-argument mappings.
    /// Known tools only get empty fields filled in. Tools absent from
    /// `discovered` are kept. Returns the updated server.
    async fn sync_tools(
        &self,
        server_id: &str,
        discovered: &[ToolDescriptor],
    ) -> Result<ServerConfig, CatalogError>;
}
