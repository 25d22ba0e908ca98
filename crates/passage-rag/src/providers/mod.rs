//! Provider abstractions for embeddings and generation
//!
//! Both capabilities are trait-based so backends can be swapped: Ollama over
//! HTTP in production, deterministic mocks in tests. Providers are stateless
//! capabilities loaded once at startup and injected into sessions.

pub mod embedding;
pub mod llm;
pub mod mock;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::GenerationProvider;
