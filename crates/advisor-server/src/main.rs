//! invest-soul HTTP Server
//!
//! Axum-based server exposing the advisor chat, market lookup and speech
//! credential endpoints.

mod config;
mod handlers;
mod speech;
mod state;

use std::sync::Arc;

use agent_core::LlmProvider;
use agent_runtime::AzureOpenAiProvider;
use axum::{
    Router,
    routing::{get, post},
};
use invest_advisor::{
    AdvisorConfig, AzureSearchClient, ChatOrchestrator, MarketAdapter, MarketSearch,
    MemoryRecordStore, RecordStore,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::handlers::{
    avatar_relay_token, chat_handler, health_check, healthy, market_top_stocks, root,
    speech_token,
};
use crate::speech::{SpeechClient, SpeechConfig};
use crate::state::AppState;

/// Routes with CORS and request tracing applied
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        // Meta
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/healthy", get(healthy))
        // Advisor
        .route("/chat", post(chat_handler))
        .route("/market/top-stocks", get(market_top_stocks))
        // Speech
        .route("/speech/token", get(speech_token))
        .route("/api/avatar/relay-token", get(avatar_relay_token))
        .layer(config.cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Model provider
    let provider: Option<Arc<dyn LlmProvider>> = match AzureOpenAiProvider::from_env() {
        Ok(provider) => {
            let info = provider.info();
            tracing::info!(provider = %info.name, model = %info.model, tools = info.supports_tools, "✓ Model provider configured");
            Some(Arc::new(provider))
        }
        Err(e) => {
            tracing::warn!("⚠ {} - chat turns will fail", e);
            None
        }
    };

    // Market search
    let market = match AzureSearchClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Azure AI Search configured");
            MarketAdapter::with_search(Arc::new(client) as Arc<dyn MarketSearch>)
        }
        Err(e) => {
            tracing::warn!("⚠ {} - using curated sector lists", e);
            MarketAdapter::curated_only()
        }
    };

    // Speech
    let speech = match SpeechConfig::from_env().map(SpeechClient::new) {
        Some(Ok(client)) => {
            tracing::info!(region = client.region(), "✓ Speech configured");
            Some(Arc::new(client))
        }
        Some(Err(e)) => {
            tracing::warn!("⚠ Speech client failed to initialize: {}", e);
            None
        }
        None => {
            tracing::warn!("⚠ SPEECH_KEY not set - speech endpoints disabled");
            None
        }
    };

    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    tracing::info!(store = store.name(), "Record store ready");

    let chat = ChatOrchestrator::new(provider, store, market, AdvisorConfig::default());
    tracing::info!("Registered tools: {}", chat.tools().names().join(", "));

    let app = build_router(AppState { chat, speech }, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 invest-soul server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health and dependencies");
    tracing::info!("  POST /chat                    - Advisor chat turn");
    tracing::info!("  GET  /market/top-stocks       - Top stocks for a sector");
    tracing::info!("  GET  /speech/token            - Browser speech token");
    tracing::info!("  GET  /api/avatar/relay-token  - Avatar relay credentials");

    axum::serve(listener, app).await?;

    Ok(())
}
