//! Similarity search over stored embeddings
//!
//! Brute-force linear scan: cost is O(n·d) over n stored entries of
//! dimension d. Fine for stores up to a few thousand entries; anything
//! larger wants an approximate-nearest-neighbor index, which this service
//! deliberately does not carry.

use crate::types::{KnowledgeEntry, SearchHit};

/// Cosine similarity of two equal-length vectors, in [-1, 1].
///
/// A zero-magnitude vector has no direction; its similarity to anything is
/// defined here as 0.0 instead of the undefined 0/0 ratio.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "cosine similarity needs equal dimensions");

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
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

/// Find the entry most similar to `query`.
///
/// Entries whose embedding length differs from the query (degraded
/// placeholder writes, stale dimensions after a model change) are skipped
/// before scoring. Exact ties resolve to the first entry in iteration
/// order; strict `>` comparison keeps the scan deterministic for a fixed
/// store order. An empty or fully-skipped candidate set yields
/// [`SearchHit::empty`].
pub fn best_match(query: &[f64], entries: &[KnowledgeEntry]) -> SearchHit {
    let mut best = SearchHit::empty();
    let mut skipped = 0usize;

    for entry in entries {
        if entry.embedding.len() != query.len() {
            skipped += 1;
            continue;
        }

        let similarity = cosine_similarity(query, &entry.embedding);
        if similarity > best.similarity {
            best = SearchHit {
                content: entry.content.clone(),
                similarity,
            };
        }
    }

    if skipped > 0 {
        tracing::debug!(
            skipped,
            query_dim = query.len(),
            "Skipped dimension-mismatched entries during search"
        );
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content: &str, embedding: Vec<f64>) -> KnowledgeEntry {
        KnowledgeEntry::new(content, embedding)
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = [0.3, -1.2, 4.5, 0.0];
        let b = [2.0, 0.7, -0.4, 1.1];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_self_similarity_is_one() {
        let a = [0.5, 2.5, -3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_opposite_is_negative_one() {
        let sim = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]);
        assert!((sim + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_similarity_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0], &[0.0]), 0.0);
    }

    #[test]
    fn test_empty_candidates_returns_sentinel() {
        let hit = best_match(&[1.0, 0.0], &[]);
        assert_eq!(hit, SearchHit::empty());
        assert!(hit.similarity <= -1.0);
    }

    #[test]
    fn test_axis_aligned_query_picks_matching_entry() {
        let entries = vec![entry("c1", vec![1.0, 0.0]), entry("c2", vec![0.0, 1.0])];
        let hit = best_match(&[1.0, 0.0], &entries);
        assert_eq!(hit.content, "c1");
        assert!((hit.similarity - 1.0).abs() < 1e-12);

        // The losing entry would have scored 0.
        assert!(cosine_similarity(&[1.0, 0.0], &entries[1].embedding).abs() < 1e-12);
    }

    #[test]
    fn test_exact_tie_first_entry_wins() {
        // Same direction, different magnitude: identical cosine scores.
        let entries = vec![entry("first", vec![2.0, 0.0]), entry("second", vec![4.0, 0.0])];
        let hit = best_match(&[1.0, 0.0], &entries);
        assert_eq!(hit.content, "first");
    }

    #[test]
    fn test_mismatched_dimensions_are_skipped() {
        let entries = vec![
            entry("placeholder", vec![0.0]),
            entry("real", vec![0.6, 0.8]),
        ];
        let hit = best_match(&[0.6, 0.8], &entries);
        assert_eq!(hit.content, "real");
    }

    #[test]
    fn test_all_mismatched_returns_sentinel() {
        let entries = vec![entry("placeholder", vec![0.0])];
        let hit = best_match(&[1.0, 0.0, 0.0], &entries);
        assert_eq!(hit, SearchHit::empty());
    }

    #[test]
    fn test_degenerate_candidate_beats_sentinel() {
        // A dimension-compatible zero vector scores 0, which still beats
        // the -1.0 sentinel.
        let entries = vec![entry("zeroed", vec![0.0, 0.0])];
        let hit = best_match(&[1.0, 0.0], &entries);
        assert_eq!(hit.content, "zeroed");
        assert_eq!(hit.similarity, 0.0);
    }
}
