//! Remote provider interfaces
//!
//! Embedding and answer generation are opaque remote services reached over
//! HTTP. Both can fail transiently with rate limiting; [`retry`] bounds how
//! often a call is re-attempted. The swallow-versus-propagate asymmetry for
//! exhausted retries lives in the engine, not here.

mod openai;
pub mod retry;

pub use openai::OpenAiProvider;
pub use retry::{retry_rate_limited, RetryPolicy};

use async_trait::async_trait;

/// Errors from remote provider calls
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Remote returned HTTP 429. The only retryable class.
    #[error("rate limited by remote API")]
    RateLimited,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("remote API returned status {status}")]
    Api { status: reqwest::StatusCode },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Produces a fixed-length embedding vector for a piece of text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a vector. Vector length is model-determined and
    /// must be stable for a given provider configuration.
    async fn embed(&self, text: &str) -> Result<Vec<f64>, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}

/// Generates a natural-language answer to a question, given the retrieved
/// context snippet.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Answer `question` using `context` (may be empty when the store is).
    async fn answer(&self, question: &str, context: &str) -> Result<String, ProviderError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
