//! Pluggable search strategies
//!
//! The index delegates candidate selection to a strategy so that the
//! exact-vs-approximate trade-off is a tunable, not a structural choice.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::metric::DistanceMetric;
use crate::types::IndexEntry;

/// An entry plus its insertion sequence number. Sequence numbers are
/// monotonically increasing and never reused; ties on score are broken by
/// the lower sequence (earlier insertion wins).
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub seq: u64,
    pub entry: IndexEntry,
}

/// Candidate selection and scoring for top-k search.
///
/// `entries` is always sorted ascending by `seq`. Implementations return at
/// most `k` `(seq, score)` pairs in strictly descending score order with
/// ties broken by ascending `seq`.
pub trait SearchStrategy: Send + Sync {
    /// Called after an entry is appended
    fn on_insert(&mut self, seq: u64, vector: &[f32]);

    /// Called after an entry is removed
    fn on_remove(&mut self, seq: u64, vector: &[f32]);

    fn search(
        &self,
        entries: &[StoredEntry],
        metric: DistanceMetric,
        query: &[f32],
        k: usize,
    ) -> Vec<(u64, f32)>;
}

/// Strategy selection, serializable for configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    /// Exact scan, recall 1.0
    #[default]
    Flat,
    /// Signed random-projection LSH, probabilistic recall
    RandomProjection {
        #[serde(default = "default_bits")]
        bits: u32,
        #[serde(default = "default_probe_depth")]
        probe_depth: u32,
        #[serde(default)]
        seed: u64,
    },
}

fn default_bits() -> u32 {
    12
}

fn default_probe_depth() -> u32 {
    2
}

impl StrategyKind {
    pub(crate) fn build(&self, dimensions: usize) -> Result<Box<dyn SearchStrategy>> {
        match *self {
            Self::Flat => Ok(Box::new(FlatStrategy)),
            Self::RandomProjection {
                bits,
                probe_depth,
                seed,
            } => {
                if bits == 0 || bits > 24 {
                    return Err(CoreError::InvalidOptions(format!(
                        "random projection bits must be in 1..=24, got {bits}"
                    )));
                }
                Ok(Box::new(RandomProjectionStrategy::new(
                    dimensions,
                    bits,
                    probe_depth,
                    seed,
                )))
            }
        }
    }
}

fn rank(mut scored: Vec<(u64, f32)>, k: usize) -> Vec<(u64, f32)> {
    scored.sort_unstable_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored.truncate(k);
    scored
}

/// Exact brute-force scan. Scores every live entry in parallel; recall is
/// exactly 1.0, cost is linear in the corpus size.
pub struct FlatStrategy;

impl SearchStrategy for FlatStrategy {
    fn on_insert(&mut self, _seq: u64, _vector: &[f32]) {}

    fn on_remove(&mut self, _seq: u64, _vector: &[f32]) {}

    fn search(
        &self,
        entries: &[StoredEntry],
        metric: DistanceMetric,
        query: &[f32],
        k: usize,
    ) -> Vec<(u64, f32)> {
        let scored: Vec<(u64, f32)> = entries
            .par_iter()
            .map(|stored| (stored.seq, metric.score(&stored.entry.vector, query)))
            .collect();
        rank(scored, k)
    }
}

/// Signed random-projection LSH.
///
/// Each vector is hashed to a `bits`-wide signature by the sign of its dot
/// product with seeded random hyperplanes; search scores only entries whose
/// bucket signature is within `probe_depth` bit flips of the query's.
/// Recall is probabilistic: vectors at cosine angle theta collide on one bit
/// with probability `1 - theta / pi`, so raising `bits` sharpens buckets and
/// raising `probe_depth` recovers recall at the cost of scan width. With
/// `probe_depth >= bits` the scan degenerates to exact search.
pub struct RandomProjectionStrategy {
    planes: Vec<Vec<f32>>,
    probe_depth: u32,
    buckets: HashMap<u64, Vec<u64>>,
}

impl RandomProjectionStrategy {
    pub fn new(dimensions: usize, bits: u32, probe_depth: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let planes = (0..bits)
            .map(|_| (0..dimensions).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect())
            .collect();
        Self {
            planes,
            probe_depth,
            buckets: HashMap::new(),
        }
    }

    fn signature(&self, vector: &[f32]) -> u64 {
        let mut sig = 0u64;
        for (i, plane) in self.planes.iter().enumerate() {
            let dot: f32 = plane.iter().zip(vector).map(|(p, v)| p * v).sum();
            if dot >= 0.0 {
                sig |= 1 << i;
            }
        }
        sig
    }

    /// All XOR masks with at most `depth` bits set, lowest weights first
    fn probe_masks(&self, depth: u32) -> Vec<u64> {
        let bits = self.planes.len() as u32;
        let mut masks = vec![0u64];
        let mut frontier = vec![0u64];
        for _ in 0..depth.min(bits) {
            let mut next = Vec::new();
            for &mask in &frontier {
                let lowest = 64 - mask.leading_zeros();
                for bit in lowest..bits {
                    next.push(mask | (1 << bit));
                }
            }
            masks.extend(&next);
            frontier = next;
        }
        masks
    }
}

impl SearchStrategy for RandomProjectionStrategy {
    fn on_insert(&mut self, seq: u64, vector: &[f32]) {
        self.buckets.entry(self.signature(vector)).or_default().push(seq);
    }

    fn on_remove(&mut self, seq: u64, vector: &[f32]) {
        if let Some(bucket) = self.buckets.get_mut(&self.signature(vector)) {
            bucket.retain(|&s| s != seq);
        }
    }

    fn search(
        &self,
        entries: &[StoredEntry],
        metric: DistanceMetric,
        query: &[f32],
        k: usize,
    ) -> Vec<(u64, f32)> {
        let sig = self.signature(query);
        let mut candidates: Vec<u64> = Vec::new();
        for mask in self.probe_masks(self.probe_depth) {
            if let Some(bucket) = self.buckets.get(&(sig ^ mask)) {
                candidates.extend(bucket);
            }
        }
        candidates.sort_unstable();

        let scored: Vec<(u64, f32)> = candidates
            .iter()
            .filter_map(|&seq| {
                entries
                    .binary_search_by_key(&seq, |stored| stored.seq)
                    .ok()
                    .map(|pos| (seq, metric.score(&entries[pos].entry.vector, query)))
            })
            .collect();
        rank(scored, k)
    }
}
