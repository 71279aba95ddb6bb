//! HTTP Peer Transport
//!
//! Picks peers with a consistent-hash ring and fetches from them over HTTP.
//! Peers serve values at `GET {peer_url}{base_path}{key}`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::{Client, Url};
use tracing::debug;

use super::{PeerGetter, PeerPicker};
use crate::consistent_hash::HashRing;
use crate::error::{CacheError, Result};

/// Path prefix under which nodes serve cached values to each other.
pub const DEFAULT_BASE_PATH: &str = "/_ringcache/";

/// Virtual ring positions per peer.
pub const DEFAULT_REPLICAS: usize = 50;

// == HTTP Getter ==
/// Fetches keys from a single peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    /// Peer url including the base path, e.g. `http://10.0.0.2:8001/_ringcache/`
    base_url: String,
    client: Client,
}

impl HttpGetter {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Builds the request url, encoding the key as a single path segment.
    fn url_for(&self, key: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CacheError::Peer(format!("invalid peer url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| CacheError::Peer(format!("peer url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let url = self.url_for(key)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::Peer(format!("request to {} failed: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Peer(format!(
                "{} returned {}",
                self.base_url, status
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))
    }
}

// == HTTP Pool ==
/// Peer picker over a set of HTTP peers, one of which is this node.
///
/// The peer set can be replaced at runtime with [`HttpPool::set_peers`];
/// the ring and getters are swapped together under one lock.
#[derive(Debug)]
pub struct HttpPool {
    /// This node's own url, e.g. `http://10.0.0.1:8001`
    self_url: String,
    base_path: String,
    replicas: usize,
    client: Client,
    state: RwLock<PoolState>,
}

#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_url`, with no peers.
    ///
    /// Urls are compared without trailing slashes, so `http://h:1/` and
    /// `http://h:1` name the same node.
    pub fn new(self_url: impl Into<String>) -> Self {
        Self::with_options(self_url, DEFAULT_BASE_PATH, DEFAULT_REPLICAS)
    }

    pub fn with_options(
        self_url: impl Into<String>,
        base_path: impl Into<String>,
        replicas: usize,
    ) -> Self {
        Self {
            self_url: normalize_url(self_url.into()),
            base_path: base_path.into(),
            replicas,
            client: Client::new(),
            state: RwLock::new(PoolState {
                ring: HashRing::new(replicas, None),
                getters: HashMap::new(),
            }),
        }
    }

    // == Set Peers ==
    /// Replaces the peer set. The list should include this node's own url
    /// so that it owns its share of the keys.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| normalize_url(peer.into()))
            .collect();

        let mut ring = HashRing::new(self.replicas, None);
        ring.add(peers.iter().cloned());

        let getters = peers
            .iter()
            .map(|peer| {
                let base_url = format!("{}{}", peer, self.base_path);
                (
                    peer.clone(),
                    Arc::new(HttpGetter::new(base_url, self.client.clone())),
                )
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
        debug!(self_url = %self.self_url, peers = peers.len(), "peer set updated");
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the current peer urls.
    pub fn peers(&self) -> Vec<String> {
        self.state.read().ring.nodes().to_vec()
    }
}

fn normalize_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_url {
            return None;
        }

        debug!(key, peer, "picked remote peer");
        let getter: Arc<dyn PeerGetter> = state.getters.get(peer)?.clone();
        Some(getter)
    }
}
