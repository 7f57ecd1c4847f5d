//! Coarse retrieval: full-scan cosine similarity over the vector index
//!
//! First-stage, cheap ranking over the whole corpus. A full scan is correct
//! for corpora in the low thousands; the `CoarseSearch` trait keeps the
//! input/output shape fixed so an approximate-nearest-neighbor index can be
//! substituted later without touching the callers.

use crate::artifact::VectorIndex;
use campusfaq_common::errors::{FaqError, Result};
use std::sync::Arc;

/// One coarse-search hit: an index position and its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    /// Position in the vector index
    pub index: usize,

    /// Cosine similarity to the query
    pub score: f32,
}

/// First-stage candidate search over the index.
///
/// Implementations must return at most `k` candidates sorted by descending
/// score, ties broken by lower index, with no duplicates.
pub trait CoarseSearch: Send + Sync {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredCandidate>>;
}

/// Cosine similarity between two vectors.
///
/// Defined as 0 when either vector has zero norm, so degenerate inputs rank
/// last instead of producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Exact full-scan retriever over the in-memory index
pub struct FullScanRetriever {
    index: Arc<VectorIndex>,
}

impl FullScanRetriever {
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self { index }
    }
}

impl CoarseSearch for FullScanRetriever {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredCandidate>> {
        if self.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.index.dimension() {
            return Err(FaqError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredCandidate> = self
            .index
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| ScoredCandidate {
                index,
                score: cosine_similarity(query, &entry.vector),
            })
            .collect();

        // Descending score, ties to the lower original index
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.index.cmp(&b.index))
        });

        scored.truncate(k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::IndexArtifact;
    use campusfaq_common::records::FaqRecord;

    fn index_with_vectors(vectors: Vec<Vec<f32>>) -> Arc<VectorIndex> {
        let records: Vec<FaqRecord> = (0..vectors.len())
            .map(|i| FaqRecord::new(format!("q{}", i), format!("a{}", i)))
            .collect();
        let artifact = IndexArtifact {
            document_texts: records.iter().map(|r| r.document_text()).collect(),
            vectors,
            records,
        };
        Arc::new(VectorIndex::from_artifact(artifact).unwrap())
    }

    #[test]
    fn test_cosine_identity_and_opposite() {
        let v = vec![0.3, -1.2, 4.0];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();

        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&v, &neg) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_scale_invariant() {
        let v = vec![1.0, 2.0, 3.0];
        let scaled: Vec<f32> = v.iter().map(|x| x * 7.5).collect();
        assert!((cosine_similarity(&v, &scaled) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        let zero = vec![0.0, 0.0];
        let v = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
    }

    #[test]
    fn test_top_k_count_and_ordering() {
        let retriever = FullScanRetriever::new(index_with_vectors(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
            vec![-1.0, 0.0],
        ]));

        let hits = retriever.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);

        // Strictly non-increasing scores
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }

        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 2);
    }

    #[test]
    fn test_k_larger_than_index_returns_all() {
        let retriever =
            FullScanRetriever::new(index_with_vectors(vec![vec![1.0, 0.0], vec![0.0, 1.0]]));
        let hits = retriever.search(&[1.0, 1.0], 20).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_ties_resolve_to_lower_index() {
        // Entries 1 and 2 are identical, so they tie exactly
        let retriever = FullScanRetriever::new(index_with_vectors(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ]));

        let hits = retriever.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[1].index, 2);
    }

    #[test]
    fn test_no_duplicate_indices() {
        let retriever = FullScanRetriever::new(index_with_vectors(vec![
            vec![1.0, 0.0],
            vec![0.5, 0.5],
            vec![0.0, 1.0],
        ]));
        let hits = retriever.search(&[1.0, 1.0], 3).unwrap();
        let mut indices: Vec<usize> = hits.iter().map(|h| h.index).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), hits.len());
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let retriever = FullScanRetriever::new(index_with_vectors(vec![vec![1.0, 0.0]]));
        let err = retriever.search(&[1.0, 0.0, 0.0], 5).unwrap_err();
        assert!(matches!(err, FaqError::DimensionMismatch { .. }));
    }
}
