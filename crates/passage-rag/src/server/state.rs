//! Shared application state

use std::sync::Arc;

use passage_core::IndexOptions;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::AnswerComposer;
use crate::ingestion::{Chunker, IngestPipeline};
use crate::providers::ollama::{OllamaEmbedder, OllamaGenerator};
use crate::providers::{EmbeddingProvider, GenerationProvider};
use crate::retrieval::Retriever;
use crate::session::SessionManager;
use crate::storage::HistoryStore;

/// Everything the request handlers need: configuration, the session
/// registry, and the pipeline components wired to the configured backends.
pub struct AppState {
    pub config: RagConfig,
    pub sessions: SessionManager,
    pub ingest: IngestPipeline,
    pub retriever: Retriever,
    pub composer: AnswerComposer,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn GenerationProvider>,
}

impl AppState {
    /// Build state with Ollama backends from configuration
    pub fn from_config(config: RagConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaEmbedder::new(&config.llm, &config.embeddings)?);
        let llm: Arc<dyn GenerationProvider> = Arc::new(OllamaGenerator::new(&config.llm)?);
        Self::with_providers(config, embedder, llm)
    }

    /// Build state with injected providers; used by tests with mocks
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn GenerationProvider>,
    ) -> Result<Arc<Self>> {
        let index_options = IndexOptions {
            dimensions: embedder.dimensions(),
            metric: config.index.metric,
            strategy: config.index.strategy,
        };
        let store = match &config.history.storage_dir {
            Some(dir) => Some(HistoryStore::new(dir.clone())?),
            None => None,
        };

        let sessions = SessionManager::new(index_options, store);
        let ingest = IngestPipeline::new(Chunker::new(config.chunking)?, Arc::clone(&embedder));
        let retriever = Retriever::new(Arc::clone(&embedder));
        let composer = AnswerComposer::new(
            Arc::clone(&llm),
            &config.llm,
            config.history.max_turns,
        );

        Ok(Arc::new(Self {
            config,
            sessions,
            ingest,
            retriever,
            composer,
            embedder,
            llm,
        }))
    }
}
