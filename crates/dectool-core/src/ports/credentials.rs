//! Credential service port.
//!
//! Secrets for remote tool servers live in an encrypted store outside this
//! workspace. Only the decrypted value for one server is requested, right
//! before a connection is built, and it is never persisted or logged.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credential service unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to decrypt secret for server {0}")]
    Decrypt(String),
}

/// "Get secret by server id" capability.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Decrypt the secret configured for `server_id`, if any.
    async fn decrypt(&self, server_id: &str) -> Result<Option<String>, CredentialError>;
}

/// Credential service with no secrets, for setups that only use stdio servers
/// or unauthenticated endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

#[async_trait]
impl CredentialService for NoCredentials {
    async fn decrypt(&self, _server_id: &str) -> Result<Option<String>, CredentialError> {
        Ok(None)
    }
}
