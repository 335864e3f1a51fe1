//! Server startup.

use std::net::SocketAddr;

use relreg_engine::Registry;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use crate::metrics::register_metrics;
use crate::router::registry_router;
use crate::state::AppState;

/// Build state (pre-warming eager routes) and serve until Ctrl-C.
///
/// The listener is bound only after the pre-warm has finished.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    register_metrics();

    let root = config.root.clone();
    let cache = ResponseCache::new(&config.cache);
    tracing::info!(
        root = %root.display(),
        cache_enabled = cache.is_enabled(),
        max_entries = config.cache.max_entries,
        ttl_secs = config.cache.ttl_secs,
        "starting release registry"
    );

    let state = tokio::task::spawn_blocking(move || {
        AppState::with_cache(Registry::new(root), cache)
    })
    .await
    .map_err(std::io::Error::other)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    let cache = state.cache.clone();
    axum::serve(listener, registry_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!(cached_entries = cache.len(), "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
