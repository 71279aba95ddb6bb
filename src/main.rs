//! ringcache - A peer-aware read-through cache node
//!
//! Serves a small demo data set through the cache, delegating each key to
//! the peer that owns it on the consistent-hash ring.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ringcache::api::{create_router, AppState};
use ringcache::error::CacheError;
use ringcache::node::{registry, CacheNode, LoaderFn};
use ringcache::peers::{HttpPool, DEFAULT_BASE_PATH};
use ringcache::Config;

/// Main entry point for a ringcache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache node with the demo loader
/// 4. Register the HTTP peer pool built from the configured peers
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ringcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ringcache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self_url={}, peers={:?}, cache_bytes={}, replicas={}, port={}",
        config.self_url, config.peers, config.cache_bytes, config.replicas, config.server_port
    );

    let node = Arc::new(CacheNode::new(config.cache_bytes, demo_db_loader()));
    let pool = HttpPool::with_options(config.self_url.clone(), DEFAULT_BASE_PATH, config.replicas);
    pool.set_peers(config.peers.iter().cloned());
    node.register_peers(Arc::new(pool));
    registry::install(node.clone());
    info!("Cache node initialized");

    let app = create_router(AppState::new(node));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    registry::clear();
    info!("Node shutdown complete");
    Ok(())
}

/// Loader over a small in-memory table standing in for a slow database.
fn demo_db_loader() -> LoaderFn<impl Fn(&str) -> ringcache::error::Result<Vec<u8>> + Send + Sync> {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    LoaderFn::new(move |key: &str| {
        info!(key, "[SlowDB] search key");
        db.get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| CacheError::NotFound(format!("{} not exist", key)))
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
