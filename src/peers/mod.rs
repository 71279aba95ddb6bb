//! Peers Module
//!
//! Capabilities a cache node uses to delegate keys owned by other nodes,
//! and the HTTP transport that implements them.
//!
//! # Components
//! - `PeerPicker`: maps a key to the peer that owns it
//! - `PeerGetter`: fetches a key from one specific peer
//! - `HttpPool` / `HttpGetter`: HTTP implementations of both

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use http::{HttpGetter, HttpPool, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

// == Peer Picker ==
/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key should be loaded
    /// locally (no peers, or this node is the owner).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Bytes>;
}
