//! Query-time retrieval over a session's index

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::session::Session;
use crate::types::document::Segment;

/// A segment retrieved for a query, with its similarity under the session
/// index's metric and the parent document's filename for attribution.
#[derive(Debug, Clone)]
pub struct RetrievedSegment {
    pub segment: Segment,
    pub filename: String,
    pub similarity: f32,
}

/// Embeds a query and fetches the top-k most similar session segments
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Retrieve up to `top_k` segments above `threshold`. Fails with
    /// `EmptyIndex` before embedding when the session has nothing ingested.
    pub async fn retrieve(
        &self,
        session: &Session,
        question: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<RetrievedSegment>> {
        if session.document_count() == 0 {
            return Err(Error::EmptyIndex);
        }

        let query_vector = self.embedder.embed(question).await?;
        let hits = session.index().search(&query_vector, top_k)?;

        let mut retrieved = Vec::with_capacity(hits.len());
        for hit in hits {
            if hit.score < threshold {
                continue;
            }
            // The segment registry and index are kept in lockstep by the
            // session; a miss here means a bug, not a user error.
            let Some(segment) = session.segment(&hit.id) else {
                tracing::error!(segment = %hit.id, "index hit missing from segment registry");
                continue;
            };
            let filename = session
                .document(&segment.document_id)
                .map(|d| d.filename)
                .unwrap_or_default();
            retrieved.push(RetrievedSegment {
                segment,
                filename,
                similarity: hit.score,
            });
        }

        tracing::debug!(
            session = %session.id(),
            retrieved = retrieved.len(),
            top_k,
            "retrieval complete"
        );
        Ok(retrieved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingConfig;
    use crate::ingestion::{Chunker, IngestFile, IngestPipeline};
    use crate::providers::mock::MockEmbedder;
    use passage_core::IndexOptions;

    async fn ingested_session(embedder: Arc<MockEmbedder>, text: &str) -> Session {
        let session = Session::new(IndexOptions::new(embedder.dimensions())).unwrap();
        let pipeline = IngestPipeline::new(
            Chunker::new(ChunkingConfig::new(50, 10)).unwrap(),
            embedder,
        );
        let report = pipeline
            .ingest_batch(
                &session,
                vec![IngestFile {
                    filename: "doc.txt".to_string(),
                    data: text.as_bytes().to_vec(),
                }],
            )
            .await;
        assert!(report.is_complete_success());
        session
    }

    #[tokio::test]
    async fn empty_session_fails_before_embedding() {
        let embedder = Arc::new(MockEmbedder::new(16));
        let session = Session::new(IndexOptions::new(16)).unwrap();
        let retriever = Retriever::new(embedder);
        let err = retriever.retrieve(&session, "anything", 5, 0.0).await.unwrap_err();
        assert!(matches!(err, Error::EmptyIndex));
    }

    #[tokio::test]
    async fn returns_at_most_k_with_filenames() {
        let embedder = Arc::new(MockEmbedder::new(64));
        let session = ingested_session(
            Arc::clone(&embedder),
            "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi",
        )
        .await;
        let retriever = Retriever::new(embedder);
        let results = retriever.retrieve(&session, "gamma delta", 2, 0.0).await.unwrap();
        assert!(results.len() <= 2);
        assert!(results.iter().all(|r| r.filename == "doc.txt"));
    }

    #[tokio::test]
    async fn threshold_filters_weak_matches() {
        let embedder = Arc::new(MockEmbedder::new(64));
        let session = ingested_session(Arc::clone(&embedder), "cats and dogs").await;
        let retriever = Retriever::new(embedder);
        let results = retriever
            .retrieve(&session, "unrelated spacecraft telemetry", 5, 0.5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
