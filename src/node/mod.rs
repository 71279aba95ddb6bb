//! Cache Node Module
//!
//! The read-through coordinator. A lookup goes:
//! local store → owning peer (if any) → loader → local store.
//!
//! # Components
//! - `CacheNode`: the coordinator and its single `get` entry point
//! - `Loader`: caller-supplied source of truth
//! - `FlightGroup`: merges concurrent misses on one key
//! - `registry`: optional process-wide accessor for a node

mod flight;
mod loader;
pub mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, CacheStore};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};

pub use flight::FlightGroup;
pub use loader::{Loader, LoaderFn};

// == Cache Node ==
/// A peer-aware read-through cache.
///
/// Values loaded locally are stored in this node's LRU store. Values fetched
/// from a peer are returned without being stored: the owning peer caches
/// them.
pub struct CacheNode {
    loader: Box<dyn Loader>,
    main_cache: CacheStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: FlightGroup,
    counters: LoadCounters,
}

impl CacheNode {
    // == Constructor ==
    /// Creates a node whose store may hold `cache_bytes` of keys and values
    /// (0 selects the store default).
    pub fn new(cache_bytes: u64, loader: impl Loader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            main_cache: CacheStore::new(cache_bytes),
            peers: OnceLock::new(),
            flight: FlightGroup::new(),
            counters: LoadCounters::default(),
        }
    }

    // == Register Peers ==
    /// Wires the peer picker used to delegate misses.
    ///
    /// # Panics
    /// Panics if peers were already registered; that is a wiring bug in the
    /// host application.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once");
        }
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    ///
    /// Loader errors are returned unchanged. Peer errors are logged and
    /// followed by a local load. No error is cached.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key).await {
            debug!(key, "cache hit");
            return Ok(value);
        }

        self.flight.run(key, || self.load(key)).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.counters.peer_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(key, error = %err, "failed to get from peer");
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(key).await?;
        self.counters.peer_loads.fetch_add(1, Ordering::Relaxed);
        Ok(ByteView::from(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await?;
        self.counters.local_loads.fetch_add(1, Ordering::Relaxed);
        debug!(key, len = bytes.len(), "loaded locally");

        let value = ByteView::from(bytes);
        self.main_cache.set(key, value.clone()).await;
        Ok(value)
    }

    // == Accessors ==
    /// The node's local LRU store.
    pub fn store(&self) -> &CacheStore {
        &self.main_cache
    }

    /// Returns store statistics together with load counters.
    pub async fn stats(&self) -> NodeStats {
        NodeStats {
            store: self.main_cache.stats().await,
            local_loads: self.counters.local_loads.load(Ordering::Relaxed),
            peer_loads: self.counters.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.counters.peer_errors.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for CacheNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheNode")
            .field("main_cache", &self.main_cache)
            .field("peers_registered", &self.peers.get().is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
struct LoadCounters {
    local_loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
}

// == Node Stats ==
/// Snapshot of a node's store and load activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeStats {
    pub store: CacheStats,
    /// Values produced by the local loader
    pub local_loads: u64,
    /// Values served by a remote peer
    pub peer_loads: u64,
    /// Peer fetches that failed and fell back to the loader
    pub peer_errors: u64,
}
