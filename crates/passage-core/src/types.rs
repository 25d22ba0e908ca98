//! Core types for the vector index

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metric::DistanceMetric;
use crate::strategy::StrategyKind;

/// An entry stored in the index: one vector per segment plus the metadata
/// needed to resolve the hit back to its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Segment id this vector belongs to
    pub id: Uuid,
    /// Embedding vector; length must equal the index dimensionality
    pub vector: Vec<f32>,
    /// Opaque metadata carried through to search hits
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl IndexEntry {
    pub fn new(id: Uuid, vector: Vec<f32>) -> Self {
        Self {
            id,
            vector,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Construction options, fixed for the lifetime of an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Vector dimensionality shared by all entries
    pub dimensions: usize,
    /// Similarity metric
    #[serde(default)]
    pub metric: DistanceMetric,
    /// Search strategy
    #[serde(default)]
    pub strategy: StrategyKind,
}

impl IndexOptions {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            metric: DistanceMetric::default(),
            strategy: StrategyKind::default(),
        }
    }
}

/// A single search result
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Id of the matching entry
    pub id: Uuid,
    /// Similarity score under the index metric
    pub score: f32,
    /// Metadata stored with the entry
    pub metadata: HashMap<String, serde_json::Value>,
}
