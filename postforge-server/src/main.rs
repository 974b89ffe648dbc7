use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use postforge_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let generator = config
        .build_generator()
        .context("invalid provider configuration")?;
    if generator.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; generation requests will fail until it is");
    }
    let leads = config
        .build_lead_recorder()
        .context("invalid lead store configuration")?;
    if !leads.is_enabled() {
        tracing::info!("lead capture disabled");
    }

    let app = router(AppState::new(generator, leads));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, model = %config.openai_model, "postforge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
