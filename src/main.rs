//! recall - Semantic knowledge service
//!
//! Stores text snippets with embeddings and answers questions from the most
//! similar stored snippet.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (port 5000, sled store under ./data)
//! OPENAI_API_KEY=sk-... cargo run --release
//!
//! # Override the bind address and store location
//! OPENAI_API_KEY=sk-... cargo run --release -- --addr 0.0.0.0:8080 --db-path /var/lib/recall
//! ```
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: remote API credential (required)
//! - `OPENAI_BASE_URL`: OpenAI-compatible API base URL
//! - `RECALL_SERVER_ADDR` / `PORT`: listening address (default port 5000)
//! - `RECALL_DB_PATH`: knowledge store location
//! - `RECALL_CONFIG`: path to a TOML config file
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use recall::api::{create_app, ServiceState};
use recall::config::ServiceConfig;
use recall::engine::KnowledgeEngine;
use recall::providers::{OpenAiProvider, RetryPolicy};
use recall::store::{KnowledgeStore, SledStore};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "recall")]
#[command(about = "Semantic knowledge store with retrieval-augmented question answering")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default: "0.0.0.0:5000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the knowledge store path
    #[arg(long)]
    db_path: Option<String>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = ServiceConfig::load();
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(path) = args.db_path {
        config.store.path = path;
    }

    // The credential is env-only and required: without it the service can
    // neither embed nor answer.
    let api_key = std::env::var("OPENAI_API_KEY")
        .context("OPENAI_API_KEY is not set; the service cannot reach the remote API")?;

    info!("Recall - semantic knowledge service");
    info!(
        addr = %config.server.addr,
        store = %config.store.path,
        base_url = %config.providers.base_url,
        embedding_model = %config.providers.embedding_model,
        chat_model = %config.providers.chat_model,
        "Configuration loaded"
    );

    let store = SledStore::open(&config.store.path).context("Failed to open knowledge store")?;
    info!(entries = store.count(), "Knowledge store ready");

    let provider = Arc::new(
        OpenAiProvider::new(
            &config.providers.base_url,
            &api_key,
            &config.providers.embedding_model,
            &config.providers.chat_model,
        )
        .context("Failed to build provider HTTP client")?,
    );

    let retry = RetryPolicy {
        max_attempts: config.retry.max_attempts,
        backoff: std::time::Duration::from_secs(config.retry.backoff_secs),
    };

    let engine = KnowledgeEngine::new(Arc::new(store), provider.clone(), provider, retry);
    let state = ServiceState::new(
        engine,
        &config.providers.embedding_model,
        &config.providers.chat_model,
    );
    let app = create_app(state);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.addr))?;
    info!(addr = %config.server.addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}
