//! Vector index over a pluggable search strategy

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::metric::DistanceMetric;
use crate::strategy::{SearchStrategy, StoredEntry};
use crate::types::{IndexEntry, IndexOptions, SearchHit};

/// In-memory vector index.
///
/// All entries share the dimensionality fixed at construction; the metric
/// and strategy are likewise fixed per instance. Thread-safe: reads take a
/// shared lock, mutations an exclusive one.
pub struct VectorIndex {
    options: IndexOptions,
    inner: RwLock<Inner>,
}

struct Inner {
    /// Live entries, sorted ascending by insertion sequence
    entries: Vec<StoredEntry>,
    next_seq: u64,
    strategy: Box<dyn SearchStrategy>,
}

impl VectorIndex {
    pub fn new(options: IndexOptions) -> Result<Self> {
        if options.dimensions == 0 {
            return Err(CoreError::InvalidOptions(
                "dimensions must be non-zero".to_string(),
            ));
        }
        let strategy = options.strategy.build(options.dimensions)?;
        Ok(Self {
            options,
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                next_seq: 0,
                strategy,
            }),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.options.dimensions
    }

    pub fn metric(&self) -> DistanceMetric {
        self.options.metric
    }

    /// Add an entry. Fails with `DimensionMismatch` before any state is
    /// touched, so a rejected insert leaves the index unchanged.
    pub fn insert(&self, entry: IndexEntry) -> Result<()> {
        if entry.vector.len() != self.options.dimensions {
            return Err(CoreError::DimensionMismatch {
                expected: self.options.dimensions,
                actual: entry.vector.len(),
            });
        }

        let mut inner = self.inner.write();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.strategy.on_insert(seq, &entry.vector);
        inner.entries.push(StoredEntry { seq, entry });
        Ok(())
    }

    /// Top-k search: at most `k` hits in strictly descending score order,
    /// ties broken by insertion order (earlier wins).
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.options.dimensions {
            return Err(CoreError::DimensionMismatch {
                expected: self.options.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let inner = self.inner.read();
        let ranked = inner
            .strategy
            .search(&inner.entries, self.options.metric, query, k);

        let hits = ranked
            .into_iter()
            .filter_map(|(seq, score)| {
                inner
                    .entries
                    .binary_search_by_key(&seq, |stored| stored.seq)
                    .ok()
                    .map(|pos| SearchHit {
                        id: inner.entries[pos].entry.id,
                        score,
                        metadata: inner.entries[pos].entry.metadata.clone(),
                    })
            })
            .collect();
        Ok(hits)
    }

    /// Remove the entry with the given id. Returns whether an entry was
    /// removed; the index stays queryable either way.
    pub fn remove(&self, id: &Uuid) -> bool {
        let mut inner = self.inner.write();
        match inner.entries.iter().position(|stored| stored.entry.id == *id) {
            Some(pos) => {
                let stored = inner.entries.remove(pos);
                inner.strategy.on_remove(stored.seq, &stored.entry.vector);
                tracing::debug!(entry = %id, "removed index entry");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}
