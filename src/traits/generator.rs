use async_trait::async_trait;

use crate::models::error::BackendError;
use crate::models::types::{GenerationMode, GenerationResult};

/// A response strategy: turns a validated prompt into generated text.
///
/// Implementations must be thread-safe (`Send + Sync`); the dispatcher shares
/// them across all in-flight requests and never holds a lock while awaiting
/// `generate`.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Which strategy this generator implements.
    fn mode(&self) -> GenerationMode;

    /// Generates a reply for an already validated, trimmed prompt.
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError>;
}
