//! Document ingestion pipeline
//!
//! Decode, dedup, chunk, embed, index. Failures are collected per document
//! into a batch report; a single bad file never aborts the upload.

pub mod chunker;

use std::sync::Arc;
use std::time::Instant;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::session::Session;
use crate::types::document::Document;
use crate::types::response::{DocumentSummary, IngestFailure, IngestReport, SkippedFile};

pub use chunker::Chunker;

/// A file submitted for ingestion: raw bytes plus its source filename.
/// Decoding beyond UTF-8 (PDF parsing etc.) is the caller's responsibility.
#[derive(Debug, Clone)]
pub struct IngestFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Chunk-embed-index pipeline shared across sessions
pub struct IngestPipeline {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl IngestPipeline {
    pub fn new(chunker: Chunker, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { chunker, embedder }
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Ingest a batch of files into a session. The caller must hold the
    /// session's ingest guard. Per-file errors land in the report.
    pub async fn ingest_batch(&self, session: &Session, files: Vec<IngestFile>) -> IngestReport {
        let start = Instant::now();
        let mut report = IngestReport {
            documents: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            total_segments: 0,
            processing_time_ms: 0,
        };

        for file in files {
            let filename = file.filename.clone();
            match self.ingest_file(session, file).await {
                Ok(Outcome::Ingested(summary)) => {
                    report.total_segments += summary.segment_count;
                    report.documents.push(summary);
                }
                Ok(Outcome::Duplicate) => {
                    tracing::info!(%filename, "skipping duplicate content");
                    report.skipped.push(SkippedFile {
                        filename,
                        reason: "identical content already ingested".to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(%filename, error = %e, "file failed ingestion");
                    report.failures.push(IngestFailure {
                        filename,
                        error: e.to_string(),
                        kind: e.kind().to_string(),
                    });
                }
            }
        }

        report.processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            session = %session.id(),
            documents = report.documents.len(),
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            segments = report.total_segments,
            "ingest batch complete"
        );
        report
    }

    async fn ingest_file(&self, session: &Session, file: IngestFile) -> Result<Outcome> {
        let text = String::from_utf8(file.data)
            .map_err(|_| Error::Document("file is not valid UTF-8 text".to_string()))?;
        if text.trim().is_empty() {
            return Err(Error::Document("file contains no text".to_string()));
        }

        let content_hash = hex::encode(Sha256::digest(text.as_bytes()));
        if session.has_content_hash(&content_hash) {
            return Ok(Outcome::Duplicate);
        }

        let char_count = text.chars().count();
        let document = Document::new(file.filename, content_hash, char_count);
        let segments = self.chunker.split(document.id, &text);

        let texts: Vec<String> = segments.iter().map(|s| s.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let mut document = document;
        document.segment_count = segments.len() as u32;
        let summary = DocumentSummary::from(&document);
        session.insert_document(document, segments, embeddings)?;

        Ok(Outcome::Ingested(summary))
    }
}

enum Outcome {
    Ingested(DocumentSummary),
    Duplicate,
}
