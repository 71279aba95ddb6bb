//! Cache Module
//!
//! Provides the byte-bounded LRU store that backs every cache node.

mod byteview;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byteview::ByteView;
pub use lru::{
    EvictionCallback, LruCache, Value, DEFAULT_MAX_BYTES, GIGABYTE, KILOBYTE, MEGABYTE,
};
pub use stats::CacheStats;
pub use store::CacheStore;
