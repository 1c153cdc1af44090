//! Environment-backed credential service.

use std::env::{self, VarError};

use async_trait::async_trait;

use dectool_core::ports::{CredentialError, CredentialService};

/// Prefix of the variables holding server secrets.
pub const SECRET_ENV_PREFIX: &str = "DECTOOL_SECRET_";

/// Reads secrets from `DECTOOL_SECRET_<SERVER_ID>`.
///
/// The server id is upper-cased and every character outside `[A-Z0-9]`
/// becomes `_`, so `3f2a-9c` is looked up as `DECTOOL_SECRET_3F2A_9C`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialService;

impl EnvCredentialService {
    pub fn variable_for(server_id: &str) -> String {
        let suffix: String = server_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{SECRET_ENV_PREFIX}{suffix}")
    }
}

#[async_trait]
impl CredentialService for EnvCredentialService {
    async fn decrypt(&self, server_id: &str) -> Result<Option<String>, CredentialError> {
        let variable = Self::variable_for(server_id);
        match env::var(&variable) {
            Ok(secret) => Ok(Some(secret)),
            Err(VarError::NotPresent) => {
                tracing::debug!(server_id, variable = %variable, "No secret in environment");
                Ok(None)
            }
            Err(VarError::NotUnicode(_)) => Err(CredentialError::Decrypt(server_id.to_string())),
        }
    }
}
