//! Ollama-backed providers over the local HTTP API

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::types::conversation::{ConversationTurn, Role};

use super::embedding::EmbeddingProvider;
use super::llm::GenerationProvider;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Config(format!("failed to build http client: {e}")))
}

/// Embedding provider backed by Ollama's `/api/embeddings` endpoint
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    max_input_chars: usize,
}

impl OllamaEmbedder {
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(llm.request_timeout_secs)?,
            base_url: llm.base_url.clone(),
            model: llm.embed_model.clone(),
            dimensions: embeddings.dimensions,
            max_input_chars: embeddings.max_input_chars,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let char_count = text.chars().count();
        if char_count > self.max_input_chars {
            return Err(Error::Embedding(format!(
                "input of {char_count} chars exceeds limit of {}",
                self.max_input_chars
            )));
        }

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("backend unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Embedding(format!(
                "backend returned {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("invalid response: {e}")))?;

        if body.embedding.len() != self.dimensions {
            return Err(Error::Embedding(format!(
                "model {} returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Generation provider backed by Ollama's `/api/chat` endpoint
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_secs)?,
            base_url: config.base_url.clone(),
            model: config.generate_model.clone(),
        })
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn generate(&self, prompt: &str, history: &[ConversationTurn]) -> Result<String> {
        let mut messages: Vec<ChatMessage> = history
            .iter()
            .map(|turn| ChatMessage {
                role: match turn.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: turn.text.clone(),
            })
            .collect();
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| Error::Generation(format!("backend unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "backend returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("invalid response: {e}")))?;

        Ok(body.message.content)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;
        Ok(matches!(response, Ok(r) if r.status().is_success()))
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
