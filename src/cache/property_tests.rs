//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the byte-budget and recency guarantees of the
//! LRU store.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::cache::{ByteView, LruCache};

// == Strategies ==
/// Generates cache keys (non-empty)
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}".prop_map(|s| s)
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
    ]
}

/// Recomputes the accounted size from scratch.
fn true_usage(lru: &LruCache<ByteView>, model: &HashMap<String, Vec<u8>>) -> u64 {
    lru.keys()
        .into_iter()
        .map(|key| (key.len() + model[key].len()) as u64)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // After every operation usage stays within budget and equals the exact
    // sum of key and value sizes of the held entries.
    #[test]
    fn prop_capacity_invariant(
        max_bytes in 16u64..256,
        ops in prop::collection::vec(cache_op_strategy(), 1..100)
    ) {
        let mut lru = LruCache::new(max_bytes, None);
        let mut model: HashMap<String, Vec<u8>> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    model.insert(key.clone(), value.clone());
                    lru.set(key, ByteView::from(value));
                }
                CacheOp::Get { key } => {
                    if let Some(found) = lru.get(&key) {
                        prop_assert_eq!(found.as_bytes(), model[&key].as_slice());
                    }
                }
            }

            prop_assert!(lru.used_bytes() <= max_bytes);
            let expected = true_usage(&lru, &model);
            prop_assert_eq!(lru.used_bytes(), expected);
            prop_assert_eq!(lru.keys().len(), lru.len(), "index and list out of step");
        }
    }

    // With room for exactly N entries, inserting an (N+1)th distinct key
    // evicts the first inserted one and nothing else.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::hash_set("[a-z]{4}", 2..10),
        new_key in "[A-Z]{4}",
    ) {
        let keys: Vec<String> = initial_keys.into_iter().collect();
        // Every entry is 4 key bytes + 4 value bytes
        let mut lru = LruCache::new((keys.len() * 8) as u64, None);
        for key in &keys {
            lru.set(key.clone(), ByteView::from(b"vvvv".to_vec()));
        }
        prop_assert_eq!(lru.len(), keys.len());

        lru.set(new_key.clone(), ByteView::from(b"vvvv".to_vec()));

        prop_assert_eq!(lru.len(), keys.len());
        prop_assert!(!lru.contains(&keys[0]), "oldest key survived");
        prop_assert!(lru.contains(&new_key));
        for key in keys.iter().skip(1) {
            prop_assert!(lru.contains(key), "key {} should not be evicted", key);
        }
    }

    // A read makes a key most recently used, so the next eviction takes
    // the following oldest key.
    #[test]
    fn prop_lru_access_tracking(
        initial_keys in prop::collection::hash_set("[a-z]{4}", 3..8),
        new_key in "[A-Z]{4}",
    ) {
        let keys: Vec<String> = initial_keys.into_iter().collect();
        let mut lru = LruCache::new((keys.len() * 8) as u64, None);
        for key in &keys {
            lru.set(key.clone(), ByteView::from(b"vvvv".to_vec()));
        }

        prop_assert!(lru.get(&keys[0]).is_some());
        lru.set(new_key, ByteView::from(b"vvvv".to_vec()));

        prop_assert!(lru.contains(&keys[0]), "touched key was evicted");
        prop_assert!(!lru.contains(&keys[1]), "second oldest key survived");
    }

    // With an unbounded budget the recency list matches a plain
    // most-recent-first model of every set and successful get.
    #[test]
    fn prop_recency_order_matches_model(
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut lru = LruCache::new(0, None);
        let mut order: Vec<String> = Vec::new();

        for op in ops {
            let touched = match op {
                CacheOp::Set { key, value } => {
                    lru.set(key.clone(), ByteView::from(value));
                    Some(key)
                }
                CacheOp::Get { key } => lru.get(&key).map(|_| key),
            };
            if let Some(key) = touched {
                order.retain(|k| k != &key);
                order.insert(0, key);
            }
        }

        let keys: Vec<String> = lru.keys().into_iter().map(str::to_string).collect();
        prop_assert_eq!(&keys, &order);
        let distinct: HashSet<&String> = order.iter().collect();
        prop_assert_eq!(distinct.len(), lru.len());
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error variant renders a JSON body with an "error" string.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::InvalidArgument(error_msg.clone()),
            CacheError::NotFound(error_msg.clone()),
            CacheError::Peer(error_msg.clone()),
            CacheError::Internal(error_msg.clone()),
        ];

        let rt = tokio::runtime::Runtime::new().unwrap();
        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(content_type.map(|ct| ct.contains("application/json")).unwrap_or(false));

            let bytes = rt.block_on(async { to_bytes(response.into_body(), usize::MAX).await.unwrap() });
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}
