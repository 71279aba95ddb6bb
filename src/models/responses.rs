//! Response DTOs for the node's HTTP API
//!
//! Defines the structure of outgoing JSON response bodies. Peer fetches
//! return raw bytes and have no DTO.

use serde::Serialize;

use crate::node::NodeStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of local store hits
    pub hits: u64,
    /// Number of local store misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in the local store
    pub total_entries: usize,
    /// Bytes used by keys and values
    pub used_bytes: u64,
    /// Byte budget of the local store
    pub max_bytes: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Values produced by the local loader
    pub local_loads: u64,
    /// Values fetched from peers
    pub peer_loads: u64,
    /// Failed peer fetches
    pub peer_errors: u64,
}

impl From<NodeStats> for StatsResponse {
    fn from(stats: NodeStats) -> Self {
        Self {
            hits: stats.store.hits,
            misses: stats.store.misses,
            evictions: stats.store.evictions,
            total_entries: stats.store.total_entries,
            used_bytes: stats.store.used_bytes,
            max_bytes: stats.store.max_bytes,
            hit_rate: stats.store.hit_rate(),
            local_loads: stats.local_loads,
            peer_loads: stats.peer_loads,
            peer_errors: stats.peer_errors,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
