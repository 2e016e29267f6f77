//! OpenAI-compatible HTTP provider
//!
//! One client implements both provider traits against a configurable base
//! URL: `/embeddings` for vectors and `/chat/completions` for answers.
//! HTTP 429 maps to [`ProviderError::RateLimited`] so the retry layer can
//! distinguish it from terminal failures.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{AnswerProvider, EmbeddingProvider, ProviderError};

/// Request timeout for provider calls
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for an OpenAI-compatible API
#[derive(Clone)]
pub struct OpenAiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    embedding_model: String,
    chat_model: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiProvider {
    /// Create a new provider client.
    pub fn new(
        base_url: &str,
        api_key: &str,
        embedding_model: &str,
        chat_model: &str,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            embedding_model: embedding_model.to_string(),
            chat_model: chat_model.to_string(),
        })
    }

    /// Base URL for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, ProviderError> {
        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": text,
            "encoding_format": "float",
        });

        let resp = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let parsed: EmbeddingResponse = resp.json().await?;
                parsed
                    .data
                    .into_iter()
                    .next()
                    .map(|d| d.embedding)
                    .ok_or_else(|| {
                        ProviderError::Malformed("embedding response had no data".to_string())
                    })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            status => Err(ProviderError::Api { status }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai-embeddings"
    }
}

#[async_trait]
impl AnswerProvider for OpenAiProvider {
    async fn answer(&self, question: &str, context: &str) -> Result<String, ProviderError> {
        let system = if context.is_empty() {
            "Answer the user's question.".to_string()
        } else {
            format!(
                "Answer the user's question using the following context:\n{context}"
            )
        };

        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": question },
            ],
        });

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let parsed: ChatResponse = resp.json().await?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content.trim().to_string())
                    .ok_or_else(|| {
                        ProviderError::Malformed("chat response had no choices".to_string())
                    })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::RateLimited),
            status => Err(ProviderError::Api { status }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai-chat"
    }
}
