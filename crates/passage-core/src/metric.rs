//! Similarity metrics

use serde::{Deserialize, Serialize};

/// Similarity metric, fixed per index instance. Higher scores are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine similarity in [-1, 1]; zero-norm vectors score 0
    #[default]
    Cosine,
    /// Raw inner product; appropriate for pre-normalized embeddings
    InnerProduct,
}

impl DistanceMetric {
    /// Similarity between two vectors of equal length
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Self::Cosine => {
                let dot = dot(a, b);
                let norm = l2_norm(a) * l2_norm(b);
                if norm == 0.0 { 0.0 } else { dot / norm }
            }
            Self::InnerProduct => dot(a, b),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![0.5, 0.5, 0.0];
        let score = DistanceMetric::Cosine.score(&v, &v);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_eq!(DistanceMetric::Cosine.score(&a, &b), 0.0);
    }

    #[test]
    fn cosine_zero_vector_scores_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 2.0];
        assert_eq!(DistanceMetric::Cosine.score(&a, &b), 0.0);
    }

    #[test]
    fn inner_product() {
        let a = vec![1.0, 2.0];
        let b = vec![3.0, 4.0];
        assert_eq!(DistanceMetric::InnerProduct.score(&a, &b), 11.0);
    }
}
