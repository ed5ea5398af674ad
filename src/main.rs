use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use account_api::{
    handler, logging,
    service::config::{ConfigService, ConfigServiceImpl},
    state::AppState,
};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(ConfigServiceImpl::new());
    logging::init(config.values().log_format);

    let state = AppState::new(config.clone())
        .await
        .context("failed to initialise account store")?;
    let app = handler::router(state);

    let bind_addr = format!("0.0.0.0:{}", config.port());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    info!(%bind_addr, "account api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
