//! Answer composition with bounded retries
//!
//! Citation integrity: the cited segment ids returned here are exactly the
//! segments embedded in the prompt, fixed before the model is called. The
//! answer text can therefore never cite a segment the model was not shown.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::GenerationProvider;
use crate::retrieval::RetrievedSegment;
use crate::types::conversation::ConversationTurn;

use super::prompt::PromptBuilder;

/// A successfully composed answer
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub text: String,
    /// Ids of the segments the prompt contained, in prompt order
    pub cited_segments: Vec<Uuid>,
}

/// Builds the grounded prompt and calls the generation backend, retrying
/// transient failures with exponential backoff.
pub struct AnswerComposer {
    llm: Arc<dyn GenerationProvider>,
    max_attempts: u32,
    base_backoff: Duration,
    max_history_turns: usize,
}

impl AnswerComposer {
    pub fn new(
        llm: Arc<dyn GenerationProvider>,
        config: &LlmConfig,
        max_history_turns: usize,
    ) -> Self {
        Self {
            llm,
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.backoff_ms),
            max_history_turns,
        }
    }

    /// Compose an answer for `question` grounded on `retrieved`, conditioned
    /// on a bounded window of prior turns. Surfaces `GenerationError` once
    /// retries are exhausted; no partial answer is ever returned.
    pub async fn compose(
        &self,
        question: &str,
        retrieved: &[RetrievedSegment],
        history: &[ConversationTurn],
    ) -> Result<ComposedAnswer> {
        let context = PromptBuilder::build_context(retrieved);
        let prompt = PromptBuilder::build_prompt(question, &context);
        let cited_segments: Vec<Uuid> = retrieved.iter().map(|r| r.segment.id).collect();

        let window_start = history.len().saturating_sub(self.max_history_turns);
        let window = &history[window_start..];

        let mut backoff = self.base_backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.llm.generate(&prompt, window).await {
                Ok(text) => {
                    return Ok(ComposedAnswer {
                        text,
                        cited_segments,
                    });
                }
                Err(Error::Generation(message)) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %message,
                        "generation attempt failed"
                    );
                    last_error = message;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Err(Error::Generation(format!(
            "exhausted {} attempts: {last_error}",
            self.max_attempts
        )))
    }
}
