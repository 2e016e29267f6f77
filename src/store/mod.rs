//! Knowledge store: durable mapping from content to its embedding
//!
//! Backends are pluggable behind [`KnowledgeStore`] so the sled-backed
//! deployment store and the in-memory test store can be swapped without
//! touching engine code.

mod sled_store;

pub use sled_store::SledStore;

use crate::types::KnowledgeEntry;

/// Trait for pluggable knowledge store backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across async tasks. Entries are keyed by their content; inserting an
/// existing key is last-write-wins, which is also how concurrent duplicate
/// adds resolve.
pub trait KnowledgeStore: Send + Sync {
    /// Look up an entry by its content key
    fn find_by_content(&self, content: &str) -> Result<Option<KnowledgeEntry>, StoreError>;

    /// Insert an entry (last-write-wins on an existing key)
    fn insert(&self, entry: &KnowledgeEntry) -> Result<(), StoreError>;

    /// All entries, in backend iteration order.
    ///
    /// The order is stable for a given backend state, which is what makes
    /// similarity tie-breaking deterministic.
    fn find_all(&self) -> Result<Vec<KnowledgeEntry>, StoreError>;

    /// Number of stored entries
    fn count(&self) -> usize;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// In-memory store for tests and minimal deployments
///
/// Thread-safe via `RwLock`. Not durable; entries are lost on restart.
pub struct MemoryStore {
    entries: std::sync::RwLock<Vec<KnowledgeEntry>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            entries: std::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeStore for MemoryStore {
    fn find_by_content(&self, content: &str) -> Result<Option<KnowledgeEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(entries.iter().find(|e| e.content == content).cloned())
    }

    fn insert(&self, entry: &KnowledgeEntry) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        // Mirror the sled backend's content-keyed semantics.
        if let Some(existing) = entries.iter_mut().find(|e| e.content == entry.content) {
            *existing = entry.clone();
        } else {
            entries.push(entry.clone());
        }

        Ok(())
    }

    fn find_all(&self) -> Result<Vec<KnowledgeEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(entries.clone())
    }

    fn count(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
