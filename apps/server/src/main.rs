mod api;
mod config;
mod error;
mod main_lib;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    main_lib::init_tracing();

    let config = AppConfig::from_env()?;
    let addr = config.listen_addr()?;
    info!(
        env = %config.app_env,
        database = %config.database_path,
        summary = %config.summary_image_path.display(),
        "Starting countryxchange server"
    );

    let state = main_lib::build_state(config).await?;
    let router = api::build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
