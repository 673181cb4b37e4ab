mod config;
mod errors;
mod llm_client;
mod routes;
mod session;
mod state;
mod thesis;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::thesis::pages::FeaturePage;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Thesis API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation client
    let llm = LlmClient::new(config.groq_api_key.clone(), config.groq_api_url.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    info!(
        "Serving {} generator pages; error banners clear after {}s",
        FeaturePage::ALL.len(),
        config.error_display_secs
    );

    let state = AppState::new(&config, Arc::new(llm));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
