//! API Handlers
//!
//! HTTP request handlers for peer fetches, statistics and health.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::Result;
use crate::models::{HealthResponse, StatsResponse};
use crate::node::CacheNode;
use crate::peers::DEFAULT_BASE_PATH;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The node answering requests
    pub node: Arc<CacheNode>,
    /// Path prefix peers fetch values under
    pub base_path: String,
}

impl AppState {
    /// Creates a new AppState serving under [`DEFAULT_BASE_PATH`].
    pub fn new(node: Arc<CacheNode>) -> Self {
        Self {
            node,
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }
}

/// Handler for GET {base_path}:key
///
/// Runs the full read-through lookup on this node and returns the raw
/// value bytes.
pub async fn peer_get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    let value = state.node.get(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value.to_bytes(),
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns current node statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.node.stats().await))
}

/// Handler for GET /health
///
/// Returns health status of the node.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::node::LoaderFn;

    fn test_state() -> AppState {
        let node = CacheNode::new(
            0,
            LoaderFn::new(|key: &str| match key {
                "Tom" => Ok(b"630".to_vec()),
                _ => Err(CacheError::NotFound(format!("{} not exist", key))),
            }),
        );
        AppState::new(Arc::new(node))
    }

    #[tokio::test]
    async fn test_peer_get_handler() {
        let state = test_state();

        let response = peer_get_handler(State(state.clone()), Path("Tom".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert!(state.node.store().contains("Tom").await);
    }

    #[tokio::test]
    async fn test_peer_get_handler_loader_error() {
        let state = test_state();

        let result = peer_get_handler(State(state), Path("Kate".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
