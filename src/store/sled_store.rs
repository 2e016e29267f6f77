//! Sled-backed knowledge store
//!
//! One default tree, keyed by the entry's content bytes, with
//! JSON-serialized values. Content keying gives the store a uniqueness
//! constraint for free: two racing adds of identical content collapse to a
//! single entry, last write wins. Keys iterate lexicographically, which
//! fixes `find_all` order across calls.

use std::path::Path;
use std::sync::Arc;

use super::{KnowledgeStore, StoreError};
use crate::types::KnowledgeEntry;

/// Durable knowledge store backed by sled
#[derive(Clone)]
pub struct SledStore {
    db: Arc<sled::Db>,
}

impl SledStore {
    /// Open or create the store database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref).map_err(|e| StoreError::Storage(e.to_string()))?;

        tracing::info!(path = ?path_ref, entries = db.len(), "Knowledge store opened");

        Ok(Self { db: Arc::new(db) })
    }
}

impl KnowledgeStore for SledStore {
    fn find_by_content(&self, content: &str) -> Result<Option<KnowledgeEntry>, StoreError> {
        match self
            .db
            .get(content.as_bytes())
            .map_err(|e| StoreError::Storage(e.to_string()))?
        {
            Some(value) => {
                let entry = serde_json::from_slice(&value)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    fn insert(&self, entry: &KnowledgeEntry) -> Result<(), StoreError> {
        let value =
            serde_json::to_vec(entry).map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.db
            .insert(entry.content.as_bytes(), value)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        self.db
            .flush()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        tracing::debug!(
            content_len = entry.content.len(),
            dim = entry.embedding.len(),
            "Stored knowledge entry"
        );

        Ok(())
    }

    fn find_all(&self) -> Result<Vec<KnowledgeEntry>, StoreError> {
        let mut entries = Vec::with_capacity(self.db.len());

        for item in self.db.iter() {
            let (_key, value) = item.map_err(|e| StoreError::Storage(e.to_string()))?;

            match serde_json::from_slice::<KnowledgeEntry>(&value) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to deserialize stored entry, skipping");
                    continue;
                }
            }
        }

        Ok(entries)
    }

    fn count(&self) -> usize {
        self.db.len()
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
