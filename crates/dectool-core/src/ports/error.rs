//! Service-level error taxonomy for tool operations.

use thiserror::Error;

use super::{CatalogError, CredentialError, ResultStoreError};

/// Errors raised at the tool service boundary.
///
/// Only configuration and catalog errors are meant to reach callers of the
/// orchestration API. Protocol errors are turned into failed tool results,
/// selection errors into empty selections, and storage errors are logged.
#[derive(Debug, Error)]
pub enum ToolServiceError {
    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A required transport field is missing or invalid.
    #[error("Invalid tool server configuration: {0}")]
    Configuration(String),

    /// Handshake failure, missing session token or an error response.
    #[error("Tool protocol error: {0}")]
    Protocol(String),

    /// Unusable model output.
    #[error("Tool selection failed: {0}")]
    Selection(String),

    /// Result persistence failed.
    #[error(transparent)]
    Storage(#[from] ResultStoreError),

    /// Secret lookup failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}
