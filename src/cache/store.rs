//! Cache Store Module
//!
//! Lock-guarded LRU store of byte views; the only shared mutable state on
//! a node's hot path.

use tokio::sync::RwLock;
use tracing::trace;

use crate::cache::{ByteView, CacheStats, LruCache};

// == Cache Store ==
/// Thread-safe LRU store of [`ByteView`] values.
///
/// Locks are held only for the map and list mutation itself, never across
/// network or loader work.
#[derive(Debug)]
pub struct CacheStore {
    lru: RwLock<LruCache<ByteView>>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store with a budget of `max_bytes` (0 selects the default).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            lru: RwLock::new(LruCache::new(max_bytes, None)),
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Unlike `contains` and `stats`, a lookup does not run under the shared
    /// lock: a hit promotes the entry to most recently used, which mutates
    /// the recency list, so lookups take the exclusive lock. The lock is
    /// released before the value is returned.
    pub async fn get(&self, key: &str) -> Option<ByteView> {
        let mut lru = self.lru.write().await;
        lru.get(key).cloned()
    }

    // == Set ==
    /// Stores a value, evicting older entries as needed.
    pub async fn set(&self, key: &str, value: ByteView) {
        let mut lru = self.lru.write().await;
        lru.set(key.to_string(), value);
        trace!(key, used_bytes = lru.used_bytes(), "populated local store");
    }

    // == Contains ==
    /// Checks for a key under the read lock without promoting it.
    pub async fn contains(&self, key: &str) -> bool {
        self.lru.read().await.contains(key)
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> CacheStats {
        self.lru.read().await.stats()
    }

    // == Length ==
    pub async fn len(&self) -> usize {
        self.lru.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lru.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = CacheStore::new(1024);
        store.set("Tom", ByteView::from("630")).await;

        let value = store.get("Tom").await;
        assert_eq!(value, Some(ByteView::from("630")));
        assert!(store.get("Jack").await.is_none());
    }

    #[tokio::test]
    async fn test_contains_does_not_count_as_lookup() {
        let store = CacheStore::new(1024);
        store.set("Tom", ByteView::from("630")).await;

        assert!(store.contains("Tom").await);
        let stats = store.stats().await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.used_bytes, 6);
    }

    #[tokio::test]
    async fn test_budget_enforced() {
        let store = CacheStore::new(10);
        store.set("key1", ByteView::from("julsj")).await;
        store.set("key2", ByteView::from("julusj")).await;

        assert!(!store.contains("key1").await);
        assert!(store.contains("key2").await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_promotes_entry() {
        // Two 6-byte entries fit in 12; a third forces one eviction
        let store = CacheStore::new(12);
        store.set("a", ByteView::from("11111")).await;
        store.set("b", ByteView::from("22222")).await;

        assert!(store.get("a").await.is_some());
        store.set("c", ByteView::from("33333")).await;

        assert!(store.contains("a").await);
        assert!(!store.contains("b").await);
        assert!(store.contains("c").await);
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let store = Arc::new(CacheStore::new(0));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key{}", i);
                store.set(&key, ByteView::from(vec![b'x'; 8])).await;
                store.get(&key).await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(store.len().await, 16);
    }
}
