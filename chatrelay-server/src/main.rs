mod error;
mod routes;
mod state;

use anyhow::Context;
use chatrelay_core::chat::ChatService;
use chatrelay_core::config;
use chatrelay_core::providers::OpenRouterProvider;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming an optional YAML config file
const CONFIG_PATH_VAR: &str = "CHATRELAY_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let settings = config::load(config_path.as_deref()).context("Failed to load settings")?;

    init_tracing(&settings.app.log_level);
    info!(
        "Starting {} v{} with model {}",
        settings.app.name,
        chatrelay_core::version(),
        settings.provider.model
    );

    let provider = OpenRouterProvider::from_settings(&settings)
        .context("Failed to create provider client")?;
    provider.warmup().await;

    let service = ChatService::new(Arc::new(provider), settings.chat.clone());
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app = routes::configure(AppState::new(service, settings));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
