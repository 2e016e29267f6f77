//! Request orchestration
//!
//! Ties providers, retry, store, and retrieval together for the two service
//! operations. The engine is constructed once at startup and injected into
//! request handlers; it owns no state beyond the store handle and provider
//! clients.
//!
//! Failure asymmetry, per contract: embedding failures past the retry
//! ceiling are swallowed (the entry is written with a placeholder vector and
//! the request succeeds), while answer failures always propagate.

use std::sync::Arc;

use tracing::{info, warn};

use crate::providers::{
    retry_rate_limited, AnswerProvider, EmbeddingProvider, ProviderError, RetryPolicy,
};
use crate::retrieval;
use crate::store::{KnowledgeStore, StoreError};
use crate::types::{KnowledgeEntry, PLACEHOLDER_EMBEDDING};

/// Errors surfaced by engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("answer generation failed: {0}")]
    Answer(#[from] ProviderError),
}

/// Outcome of an add-knowledge request
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// The stored entry (existing or newly created)
    pub entry: KnowledgeEntry,

    /// False when the content was already present
    pub created: bool,
}

/// Orchestrates the add-knowledge and ask-question flows
#[derive(Clone)]
pub struct KnowledgeEngine {
    store: Arc<dyn KnowledgeStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    answerer: Arc<dyn AnswerProvider>,
    retry: RetryPolicy,
}

impl KnowledgeEngine {
    /// Create an engine over the given store and providers.
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        answerer: Arc<dyn AnswerProvider>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            embedder,
            answerer,
            retry,
        }
    }

    /// Number of stored entries
    pub fn entry_count(&self) -> usize {
        self.store.count()
    }

    /// Store backend name for diagnostics
    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Embed `text`, degrading to the placeholder vector when embedding
    /// generation fails past the retry ceiling. The caller's request still
    /// succeeds with the degraded vector.
    async fn embed_or_placeholder(&self, text: &str) -> Vec<f64> {
        match retry_rate_limited(self.retry, || self.embedder.embed(text)).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(
                    provider = self.embedder.provider_name(),
                    error = %e,
                    "Embedding generation failed, substituting placeholder vector"
                );
                PLACEHOLDER_EMBEDDING.to_vec()
            }
        }
    }

    /// Store a snippet, embedding it on the way in.
    ///
    /// Idempotent per unique content: re-adding returns the original entry
    /// with its original embedding. The existence check and insert are not
    /// atomic: two racing adds of the same content both insert, and the
    /// content-keyed store resolves them last-write-wins.
    pub async fn add_knowledge(&self, content: &str) -> Result<AddOutcome, EngineError> {
        if let Some(existing) = self.store.find_by_content(content)? {
            info!(dim = existing.embedding.len(), "Content already present, returning existing entry");
            return Ok(AddOutcome {
                entry: existing,
                created: false,
            });
        }

        let embedding = self.embed_or_placeholder(content).await;
        let entry = KnowledgeEntry::new(content, embedding);
        self.store.insert(&entry)?;

        info!(
            dim = entry.embedding.len(),
            degraded = entry.is_degraded(),
            total = self.store.count(),
            "Knowledge entry added"
        );

        Ok(AddOutcome {
            entry,
            created: true,
        })
    }

    /// Answer a question using the most similar stored snippet as context.
    ///
    /// An empty knowledge base routes an empty-string context to the answer
    /// call. A degraded question embedding matches no real entry, so it
    /// takes the same empty-context path. Answer-generation failure
    /// propagates to the caller.
    pub async fn ask(&self, question: &str) -> Result<String, EngineError> {
        let query = self.embed_or_placeholder(question).await;

        let entries = self.store.find_all()?;
        let hit = retrieval::best_match(&query, &entries);

        info!(
            candidates = entries.len(),
            similarity = hit.similarity,
            context_len = hit.content.len(),
            "Selected context for question"
        );

        let answer =
            retry_rate_limited(self.retry, || self.answerer.answer(question, &hit.content))
                .await?;

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Embedder that returns a fixed vector, counting calls.
    struct FixedEmbedder {
        vector: Vec<f64>,
        calls: AtomicU32,
    }

    impl FixedEmbedder {
        fn new(vector: Vec<f64>) -> Self {
            Self {
                vector,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f64>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    /// Embedder that always fails terminally.
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f64>, ProviderError> {
            Err(ProviderError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        }

        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    /// Answerer that echoes its inputs so tests can see what context it got.
    struct EchoAnswerer;

    #[async_trait]
    impl AnswerProvider for EchoAnswerer {
        async fn answer(&self, question: &str, context: &str) -> Result<String, ProviderError> {
            Ok(format!("q={question};ctx={context}"))
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }
    }

    struct BrokenAnswerer;

    #[async_trait]
    impl AnswerProvider for BrokenAnswerer {
        async fn answer(&self, _question: &str, _context: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            })
        }

        fn provider_name(&self) -> &'static str {
            "broken"
        }
    }

    fn engine_with(
        embedder: Arc<dyn EmbeddingProvider>,
        answerer: Arc<dyn AnswerProvider>,
    ) -> KnowledgeEngine {
        KnowledgeEngine::new(
            Arc::new(MemoryStore::new()),
            embedder,
            answerer,
            RetryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_add_then_re_add_returns_original_entry() {
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0]));
        let engine = engine_with(embedder.clone(), Arc::new(EchoAnswerer));

        let first = engine.add_knowledge("water is wet").await.unwrap();
        assert!(first.created);
        assert_eq!(first.entry.embedding, vec![1.0, 0.0]);

        let second = engine.add_knowledge("water is wet").await.unwrap();
        assert!(!second.created);
        assert_eq!(second.entry, first.entry);

        // The second add never re-embeds.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_add_with_broken_embedder_degrades_to_placeholder() {
        let engine = engine_with(Arc::new(BrokenEmbedder), Arc::new(EchoAnswerer));

        let outcome = engine.add_knowledge("unembeddable").await.unwrap();
        assert!(outcome.created);
        assert!(outcome.entry.is_degraded());
        assert_eq!(outcome.entry.embedding, vec![0.0]);
        assert_eq!(engine.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_ask_empty_store_routes_empty_context() {
        let engine = engine_with(Arc::new(FixedEmbedder::new(vec![1.0, 0.0])), Arc::new(EchoAnswerer));

        let answer = engine.ask("anything?").await.unwrap();
        assert_eq!(answer, "q=anything?;ctx=");
    }

    #[tokio::test]
    async fn test_ask_selects_most_similar_content() {
        // Seed the store directly so entries carry distinct embeddings.
        let store = MemoryStore::new();
        store
            .insert(&KnowledgeEntry::new("aligned", vec![1.0, 0.0]))
            .unwrap();
        store
            .insert(&KnowledgeEntry::new("orthogonal", vec![0.0, 1.0]))
            .unwrap();

        let engine = KnowledgeEngine::new(
            Arc::new(store),
            Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
            Arc::new(EchoAnswerer),
            RetryPolicy::default(),
        );

        let answer = engine.ask("which one?").await.unwrap();
        assert_eq!(answer, "q=which one?;ctx=aligned");
    }

    #[tokio::test]
    async fn test_ask_with_broken_answerer_propagates() {
        let engine = engine_with(Arc::new(FixedEmbedder::new(vec![1.0, 0.0])), Arc::new(BrokenAnswerer));

        let result = engine.ask("doomed").await;
        assert!(matches!(result, Err(EngineError::Answer(_))));
    }

    #[tokio::test]
    async fn test_ask_with_broken_embedder_still_answers() {
        // A dead embedding service degrades the query vector; retrieval then
        // skips every real entry and the answer call gets empty context.
        let store = MemoryStore::new();
        store
            .insert(&KnowledgeEntry::new("real entry", vec![1.0, 0.0]))
            .unwrap();

        let engine = KnowledgeEngine::new(
            Arc::new(store),
            Arc::new(BrokenEmbedder),
            Arc::new(EchoAnswerer),
            RetryPolicy::default(),
        );

        let answer = engine.ask("still works?").await.unwrap();
        assert_eq!(answer, "q=still works?;ctx=");
    }
}
