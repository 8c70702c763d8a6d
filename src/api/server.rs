//! HTTP server lifecycle.
//!
//! Binds the configured address, mounts `api_router()`, and serves until
//! ctrl-c. Migrations have already run by the time this is called; the
//! upload directory is created here so `ServeDir` has something to serve.

use std::io;
use std::sync::Arc;

use crate::api::router::api_router;
use crate::config::Config;

/// Bind and serve the API. Runs until ctrl-c.
pub async fn serve(config: Arc<Config>) -> io::Result<()> {
    std::fs::create_dir_all(&config.upload_dir)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, api_router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
