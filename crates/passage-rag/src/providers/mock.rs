//! Deterministic offline providers for tests and demos
//!
//! The embedder hashes lowercase alphanumeric words into a fixed number of
//! buckets and normalizes, so identical input always yields the identical
//! vector and texts sharing vocabulary land close under cosine similarity.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::types::conversation::ConversationTurn;

use super::embedding::EmbeddingProvider;
use super::llm::GenerationProvider;

/// Deterministic bag-of-words embedder
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

// FNV-1a; deterministic across runs, unlike the std RandomState hashers
fn fnv1a(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = (fnv1a(&word.to_lowercase()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Scriptable generator: a fixed answer, optionally preceded by a number of
/// transient failures to exercise the composer's retry path.
pub struct MockGenerator {
    answer: String,
    fail_first: u32,
    calls: AtomicU32,
}

impl MockGenerator {
    /// Always returns `answer`
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            fail_first: 0,
            calls: AtomicU32::new(0),
        }
    }

    /// Fails the first `n` calls with a transient error, then answers
    pub fn failing_then(n: u32, answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            fail_first: n,
            calls: AtomicU32::new(0),
        }
    }

    /// Number of generate calls observed
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for MockGenerator {
    async fn generate(&self, _prompt: &str, _history: &[ConversationTurn]) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(Error::Generation("simulated transient failure".into()));
        }
        Ok(self.answer.clone())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_input_identical_vector() {
        let embedder = MockEmbedder::new(32);
        let a = embedder.embed("vacation days per year").await.unwrap();
        let b = embedder.embed("vacation days per year").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_higher() {
        let embedder = MockEmbedder::new(64);
        let query = embedder.embed("how many vacation days?").await.unwrap();
        let related = embedder.embed("vacation days: 20 per year").await.unwrap();
        let unrelated = embedder.embed("quarterly revenue figures").await.unwrap();

        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let embedder = MockEmbedder::new(16);
        let texts = vec!["first one".to_string(), "second one".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[0], embedder.embed("first one").await.unwrap());
        assert_eq!(batch[1], embedder.embed("second one").await.unwrap());
    }

    #[tokio::test]
    async fn generator_fails_then_answers() {
        let generator = MockGenerator::failing_then(2, "ok");
        assert!(generator.generate("p", &[]).await.is_err());
        assert!(generator.generate("p", &[]).await.is_err());
        assert_eq!(generator.generate("p", &[]).await.unwrap(), "ok");
        assert_eq!(generator.call_count(), 3);
    }
}
