//! Shared data structures for the knowledge service
//!
//! Defines the core types carried through the add/ask pipeline:
//! - KnowledgeEntry: a stored snippet with its embedding vector
//! - SearchHit: the result of a similarity search over the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embedding written in place of a real vector when embedding generation has
/// permanently failed. Single-dimensional, so retrieval's dimension check
/// excludes degraded entries from comparison against real query vectors.
pub const PLACEHOLDER_EMBEDDING: &[f64] = &[0.0];

/// A stored snippet with its embedding vector.
///
/// `content` is the natural key: adds are idempotent per unique content.
/// Entries are never updated in place and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeEntry {
    /// The snippet text
    pub content: String,

    /// Embedding vector produced by the remote model (or the placeholder)
    pub embedding: Vec<f64>,

    /// When the entry was first written
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(content: impl Into<String>, embedding: Vec<f64>) -> Self {
        Self {
            content: content.into(),
            embedding,
            created_at: Utc::now(),
        }
    }

    /// Whether this entry carries the degraded placeholder embedding.
    pub fn is_degraded(&self) -> bool {
        self.embedding == PLACEHOLDER_EMBEDDING
    }
}

/// Best-matching entry from a similarity search, with its cosine score.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    /// Content of the best-matching entry (empty for the sentinel)
    pub content: String,

    /// Cosine similarity to the query, in [-1, 1]
    pub similarity: f64,
}

impl SearchHit {
    /// Sentinel for an empty candidate set. The similarity sits below any
    /// achievable cosine score, so a genuine candidate always wins.
    pub fn empty() -> Self {
        Self {
            content: String::new(),
            similarity: -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_roundtrip() {
        let entry = KnowledgeEntry::new("the sky is blue", vec![0.1, 0.2, 0.3]);
        let json = serde_json::to_string(&entry).unwrap();
        let back: KnowledgeEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_degraded_detection() {
        let real = KnowledgeEntry::new("real", vec![0.4, 0.6]);
        let degraded = KnowledgeEntry::new("degraded", PLACEHOLDER_EMBEDDING.to_vec());
        assert!(!real.is_degraded());
        assert!(degraded.is_degraded());
    }

    #[test]
    fn test_entry_parses_without_created_at() {
        // Entries written before the timestamp field existed still load.
        let json = r#"{"content":"legacy","embedding":[1.0,0.0]}"#;
        let entry: KnowledgeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.content, "legacy");
        assert_eq!(entry.embedding, vec![1.0, 0.0]);
    }

    #[test]
    fn test_sentinel_below_any_cosine() {
        let sentinel = SearchHit::empty();
        assert!(sentinel.content.is_empty());
        assert!(sentinel.similarity < -0.999);
    }
}
