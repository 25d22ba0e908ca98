//! passage-rag: session-scoped RAG pipeline with cited answers
//!
//! Documents are chunked into overlapping segments, embedded, and indexed in
//! a per-session vector index. Queries retrieve the most similar segments,
//! compose a grounded prompt with bounded conversation history, and return
//! an answer citing exactly the segments the prompt contained. Embedding and
//! generation backends are trait-based and injected at startup.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    conversation::{ConversationTurn, Role},
    document::{Document, Segment},
    query::QueryRequest,
    response::{Citation, IngestReport, QueryResponse},
};

/// Re-export the index engine for convenience
pub use passage_core;
