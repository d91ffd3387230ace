mod config;
mod document;
mod errors;
mod evaluation;
mod llm_client;
mod routes;
mod state;
mod table;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::llm_client::AzureOpenAiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EQE API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize completion client
    let llm = AzureOpenAiClient::new(&config.llm).context("Failed to build LLM client")?;
    info!(
        deployment = %config.llm.deployment,
        api_version = %config.llm.api_version,
        max_attempts = config.llm.max_attempts,
        "LLM client initialized"
    );

    let evaluator = Evaluator::new(Arc::new(llm), config.llm.max_tokens);

    // Build app state
    let state = AppState {
        config: config.clone(),
        evaluator,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict CORS to the form's origin once it is hosted
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
