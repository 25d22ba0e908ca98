//! Error taxonomy for the RAG pipeline
//!
//! Every query-path failure carries a machine-readable `kind` so API clients
//! can render "no documents yet" differently from "AI backend unavailable".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad chunking or server configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Index-level failure, including embedding/index dimensionality mismatch
    #[error(transparent)]
    Index(#[from] passage_core::CoreError),

    /// Embedding backend failure or oversized input
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Query issued against a session with no ingested documents. Distinct
    /// from a successful query with no relevant results.
    #[error("session has no ingested documents")]
    EmptyIndex,

    /// Generation backend failure, surfaced after retries are exhausted
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("session {0} is closed")]
    SessionClosed(Uuid),

    /// Per-document rejection during ingestion (bad encoding, empty file)
    #[error("document rejected: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Machine-readable discriminator exposed in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Index(passage_core::CoreError::DimensionMismatch { .. }) => "dimension_mismatch",
            Self::Index(_) => "index",
            Self::Embedding(_) => "embedding_unavailable",
            Self::EmptyIndex => "empty_index",
            Self::Generation(_) => "generation_unavailable",
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionClosed(_) => "session_closed",
            Self::Document(_) => "document_rejected",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Document(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionClosed(_) => StatusCode::CONFLICT,
            Self::EmptyIndex => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Embedding(_) | Self::Generation(_) => StatusCode::BAD_GATEWAY,
            Self::Index(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(kind = self.kind(), %status, "request failed: {self}");
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        assert_eq!(Error::EmptyIndex.kind(), "empty_index");
        assert_eq!(
            Error::Generation("backend down".into()).kind(),
            "generation_unavailable"
        );
        assert_ne!(Error::EmptyIndex.kind(), Error::Generation(String::new()).kind());
    }

    #[test]
    fn dimension_mismatch_maps_to_own_kind() {
        let err = Error::from(passage_core::CoreError::DimensionMismatch {
            expected: 768,
            actual: 384,
        });
        assert_eq!(err.kind(), "dimension_mismatch");
    }
}
