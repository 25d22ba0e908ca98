//! passage-core: in-memory vector index for session-scoped retrieval
//!
//! Stores `(vector, id, metadata)` entries of a fixed dimensionality and
//! answers top-k nearest-neighbor queries. The scan strategy is pluggable:
//! the default exact scan has recall 1.0; an LSH strategy trades recall for
//! latency on larger corpora.

pub mod error;
pub mod index;
pub mod metric;
pub mod strategy;
pub mod types;

pub use error::{CoreError, Result};
pub use index::VectorIndex;
pub use metric::DistanceMetric;
pub use strategy::{FlatStrategy, RandomProjectionStrategy, SearchStrategy, StrategyKind};
pub use types::{IndexEntry, IndexOptions, SearchHit};
