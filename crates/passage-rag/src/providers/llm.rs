//! Generation provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::conversation::ConversationTurn;

/// Produces an answer from a grounded prompt plus bounded conversation
/// history. Calls may fail transiently; retry policy lives in the answer
/// composer, not here.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for the prompt, conditioned on prior turns
    async fn generate(&self, prompt: &str, history: &[ConversationTurn]) -> Result<String>;

    /// Check whether the backend is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
