//! ringcache - A peer-aware read-through cache
//!
//! Each node keeps a byte-bounded LRU store. On a miss it asks the
//! consistent-hash ring which node owns the key, fetches from that peer
//! over HTTP, and falls back to a caller-supplied loader when no peer
//! serves the value.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistent_hash;
pub mod error;
pub mod models;
pub mod node;
pub mod peers;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use consistent_hash::HashRing;
pub use error::{CacheError, Result};
pub use node::{CacheNode, Loader, LoaderFn};
pub use peers::{HttpPool, PeerGetter, PeerPicker};
