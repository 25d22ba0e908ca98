//! Document and segment types with offset tracking for citations

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document that has been ingested. Immutable once created and owned by
/// the session that uploaded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document id
    pub id: Uuid,
    /// Source filename as uploaded
    pub filename: String,
    /// Content hash for deduplication (hex-encoded SHA-256)
    pub content_hash: String,
    /// Text length in characters
    pub char_count: usize,
    /// Number of segments created
    pub segment_count: u32,
    /// Ingestion timestamp
    pub ingested_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    pub fn new(filename: String, content_hash: String, char_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            content_hash,
            char_count,
            segment_count: 0,
            ingested_at: chrono::Utc::now(),
        }
    }
}

/// A bounded span of a document's text, the unit of retrieval. Offsets are
/// character positions into the original text; consecutive segments overlap
/// by the configured window overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Unique segment id
    pub id: Uuid,
    /// Parent document (non-owning back-reference)
    pub document_id: Uuid,
    /// Segment text
    pub content: String,
    /// Character offsets in the original document
    pub char_start: usize,
    pub char_end: usize,
    /// Position within the document's segment sequence
    pub segment_index: u32,
}

impl Segment {
    pub fn new(
        document_id: Uuid,
        content: String,
        char_start: usize,
        char_end: usize,
        segment_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            content,
            char_start,
            char_end,
            segment_index,
        }
    }

    /// Metadata stored alongside the vector in the index
    pub fn to_index_metadata(&self, filename: &str) -> HashMap<String, serde_json::Value> {
        let mut meta = HashMap::new();
        meta.insert("document_id".to_string(), serde_json::json!(self.document_id));
        meta.insert("filename".to_string(), serde_json::json!(filename));
        meta.insert("segment_index".to_string(), serde_json::json!(self.segment_index));
        meta
    }
}
