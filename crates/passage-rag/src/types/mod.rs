//! Core types for the RAG system

pub mod conversation;
pub mod document;
pub mod query;
pub mod response;

pub use conversation::{ConversationTurn, Role};
pub use document::{Document, Segment};
pub use query::QueryRequest;
pub use response::{
    Citation, DocumentSummary, IngestFailure, IngestReport, QueryResponse, SessionSummary,
    SkippedFile,
};
