//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;

use crate::peers::DEFAULT_REPLICAS;

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_CACHE_BYTES: u64 = 2 << 10;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Url other peers reach this node at
    pub self_url: String,
    /// Urls of every node in the cluster, including this one
    pub peers: Vec<String>,
    /// Byte budget of the local store (0 selects the store default)
    pub cache_bytes: u64,
    /// Virtual ring positions per peer
    pub replicas: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `SELF_URL` - This node's url (default: `http://127.0.0.1:<port>`)
    /// - `PEERS` - Comma-separated peer urls (default: just `SELF_URL`)
    /// - `CACHE_BYTES` - Local store budget in bytes (default: 2048)
    /// - `RING_REPLICAS` - Virtual nodes per peer (default: 50)
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let self_url = env::var("SELF_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| local_url(server_port));
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_url.clone()]);

        Self {
            server_port,
            self_url,
            peers,
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CACHE_BYTES),
            replicas: env::var("RING_REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&r| r > 0)
                .unwrap_or(DEFAULT_REPLICAS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_url = local_url(DEFAULT_PORT);
        Self {
            server_port: DEFAULT_PORT,
            peers: vec![self_url.clone()],
            self_url,
            cache_bytes: DEFAULT_CACHE_BYTES,
            replicas: DEFAULT_REPLICAS,
        }
    }
}

fn local_url(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

/// Splits a comma-separated peer list, dropping blanks and trailing slashes.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
