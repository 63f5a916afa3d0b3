//! RDA server entry point

use std::sync::Arc;

use anyhow::Context;
use rda_server::utils::logging::init_logging;
use rda_server::{build_router, AppContext};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    init_logging().context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env loaded"),
    }

    let config = rda_infra::config::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let context = Arc::new(AppContext::new(config).context("failed to build application")?);
    let app = build_router(context);

    let listener = TcpListener::bind(bind_addr.as_str())
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "rda server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("rda server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
