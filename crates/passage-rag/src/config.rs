//! Configuration for the RAG system

use std::path::{Path, PathBuf};

use passage_core::{DistanceMetric, StrategyKind};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration, loadable from TOML with per-section defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Retrieval defaults
    pub retrieval: RetrievalConfig,
    /// Conversation history configuration
    pub history: HistoryConfig,
    /// Per-session vector index configuration
    pub index: IndexConfig,
}

impl RagConfig {
    /// Load from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be non-zero".into()));
        }
        if self.llm.max_attempts == 0 {
            return Err(Error::Config("llm.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum multipart upload size in bytes
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_size: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive segments
    pub overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be non-zero".into()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunking.overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 120,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Vector dimensionality the backend produces
    pub dimensions: usize,
    /// Inputs longer than this are rejected with an embedding error
    pub max_input_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: 768,
            max_input_chars: 8192,
        }
    }
}

/// LLM backend configuration (Ollama-compatible HTTP API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the backend
    pub base_url: String,
    /// Model used for embeddings
    pub embed_model: String,
    /// Model used for answer generation
    pub generate_model: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Generation attempts before surfacing a generation error
    pub max_attempts: u32,
    /// Base backoff between attempts in milliseconds, doubled per retry
    pub backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            request_timeout_secs: 120,
            max_attempts: 3,
            backoff_ms: 250,
        }
    }
}

/// Retrieval defaults, overridable per request
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of segments to retrieve
    pub top_k: usize,
    /// Minimum similarity for a segment to enter the prompt; 0 disables
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.0,
        }
    }
}

/// Conversation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Turns of prior conversation included in generation
    pub max_turns: usize,
    /// Directory for per-session history files; None disables persistence
    pub storage_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 8,
            storage_dir: None,
        }
    }
}

/// Per-session vector index configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    pub metric: DistanceMetric,
    pub strategy: StrategyKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        RagConfig::default().validate().unwrap();
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let cfg = ChunkingConfig::new(50, 50);
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        let cfg = ChunkingConfig::new(50, 49);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
    }

    #[test]
    fn parses_partial_toml() {
        let config: RagConfig = toml::from_str(
            r#"
            [chunking]
            chunk_size = 400

            [llm]
            generate_model = "phi3"
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.chunking.overlap, 120);
        assert_eq!(config.llm.generate_model, "phi3");
        assert_eq!(config.retrieval.top_k, 5);
    }
}
