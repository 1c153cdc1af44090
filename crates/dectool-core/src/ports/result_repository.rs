//! Tool result repository trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StoredToolResult;

/// Errors for result persistence.
#[derive(Debug, Error)]
pub enum ResultStoreError {
    /// No result with this id.
    #[error("Tool result not found: {0}")]
    NotFound(String),

    /// A result with this id was already written. Results are immutable.
    #[error("Tool result already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error.
    #[error("Result storage error: {0}")]
    Storage(String),
}

/// Append-only store of tool invocation outcomes.
///
/// Records are never mutated; they are only created or deleted by id.
#[async_trait]
pub trait ToolResultRepository: Send + Sync {
    /// Persist a new result.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a result with the same id was saved before
    /// - `Storage` for I/O failures
    async fn save(&self, result: &StoredToolResult) -> Result<(), ResultStoreError>;

    /// Read a result by id.
    async fn get(&self, id: &str) -> Result<StoredToolResult, ResultStoreError>;

    /// List results, oldest first, optionally restricted to one owner.
    async fn list(&self, owner_id: Option<&str>) -> Result<Vec<StoredToolResult>, ResultStoreError>;

    /// Delete a result by id.
    async fn delete(&self, id: &str) -> Result<(), ResultStoreError>;

    /// Delete every result tagged with `owner_id`. Returns how many were removed.
    async fn delete_by_owner(&self, owner_id: &str) -> Result<usize, ResultStoreError>;
}
