//! API response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::retrieval::RetrievedSegment;
use crate::types::conversation::ConversationTurn;
use crate::types::document::Document;

/// A cited source segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Segment id
    pub segment_id: Uuid,
    /// Parent document id
    pub document_id: Uuid,
    /// Source filename
    pub filename: String,
    /// Segment position within the document
    pub segment_index: u32,
    /// Character span in the original document
    pub char_start: usize,
    pub char_end: usize,
    /// Snippet from the source, truncated at a word boundary
    pub snippet: String,
    /// Similarity score (higher is better)
    pub similarity: f32,
}

impl Citation {
    /// Build a citation from a retrieved segment
    pub fn from_retrieved(retrieved: &RetrievedSegment) -> Self {
        let segment = &retrieved.segment;
        Self {
            segment_id: segment.id,
            document_id: segment.document_id,
            filename: retrieved.filename.clone(),
            segment_index: segment.segment_index,
            char_start: segment.char_start,
            char_end: segment.char_end,
            snippet: truncate_snippet(&segment.content, 240),
            similarity: retrieved.similarity,
        }
    }

    /// Format for display in text, e.g. `[Source: policy.txt, segment 2]`
    pub fn format_inline(&self) -> String {
        format!("[Source: {}, segment {}]", self.filename, self.segment_index)
    }
}

/// Truncate a snippet to a maximum length, preserving word boundaries
pub fn truncate_snippet(snippet: &str, max_len: usize) -> String {
    if snippet.len() <= max_len {
        return snippet.to_string();
    }

    let mut end = max_len;
    while end > 0 && !snippet.is_char_boundary(end) {
        end -= 1;
    }

    if let Some(pos) = snippet[..end].rfind(' ') {
        return format!("{}...", &snippet[..pos]);
    }

    format!("{}...", &snippet[..end])
}

/// Response from a session query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer
    pub answer: String,
    /// Citations for every segment the prompt contained
    pub citations: Vec<Citation>,
    /// Average similarity of the cited segments (0 when none)
    pub confidence: f32,
    /// Number of segments retrieved before threshold filtering
    pub segments_retrieved: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl QueryResponse {
    pub fn new(answer: String, citations: Vec<Citation>, processing_time_ms: u64) -> Self {
        let confidence = if citations.is_empty() {
            0.0
        } else {
            citations.iter().map(|c| c.similarity).sum::<f32>() / citations.len() as f32
        };
        Self {
            answer,
            confidence,
            segments_retrieved: citations.len(),
            citations,
            processing_time_ms,
        }
    }

    /// Successful response for a query with no relevant segments. Not to be
    /// confused with querying an empty session, which is an error.
    pub fn no_relevant_results(processing_time_ms: u64) -> Self {
        Self {
            answer: "I couldn't find relevant information in the session's documents to answer this question.".to_string(),
            citations: Vec::new(),
            confidence: 0.0,
            segments_retrieved: 0,
            processing_time_ms,
        }
    }
}

/// Summary of an ingested document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub segment_count: u32,
    pub char_count: usize,
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            segment_count: doc.segment_count,
            char_count: doc.char_count,
            ingested_at: doc.ingested_at,
        }
    }
}

/// A file skipped during ingestion (e.g. duplicate content)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// A file that failed ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFailure {
    pub filename: String,
    pub error: String,
    /// Machine-readable error kind
    pub kind: String,
}

/// Batch summary for an upload. Failures are collected per document; one
/// bad file never aborts the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub documents: Vec<DocumentSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<IngestFailure>,
    pub total_segments: u32,
    pub processing_time_ms: u64,
}

impl IngestReport {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Summary of a live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub state: String,
    pub document_count: usize,
    pub turn_count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Conversation history for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub turns: Vec<ConversationTurn>,
}
