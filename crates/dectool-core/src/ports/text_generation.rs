//! Text generation port.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Text generation failed: {0}")]
pub struct GenerationError(pub String);

/// `generate(prompt) -> text` capability provided by the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
