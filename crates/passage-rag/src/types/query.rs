//! Query request types

use serde::{Deserialize, Serialize};

/// Query request against a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Number of segments to retrieve; defaults to the server's
    /// retrieval configuration
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Minimum similarity for a segment to enter the prompt
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: None,
            similarity_threshold: None,
        }
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }
}
