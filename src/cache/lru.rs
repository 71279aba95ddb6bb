//! LRU Store Module
//!
//! Byte-bounded Least Recently Used store with O(1) lookup, promotion and
//! eviction.

use std::collections::HashMap;
use std::fmt;

use crate::cache::CacheStats;

// == Size Constants ==
pub const KILOBYTE: u64 = 1 << 10;
pub const MEGABYTE: u64 = 1 << 20;
pub const GIGABYTE: u64 = 1 << 30;

/// Budget substituted when a store is created with a capacity of zero.
pub const DEFAULT_MAX_BYTES: u64 = 8192 * MEGABYTE;

// == Value Trait ==
/// A value whose memory footprint can be reported in bytes.
pub trait Value {
    /// Number of bytes this value accounts for.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Callback invoked with every entry removed by eviction.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send + Sync>;

/// Node in the recency list, stored in a slab and linked by index.
struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Key-value store bounded by the total size of its keys and values.
///
/// Recency is tracked in a doubly-linked list:
/// - head = most recently used
/// - tail = least recently used
///
/// Every key in `index` points at exactly one live node and every live node
/// is reachable from `index`.
pub struct LruCache<V> {
    /// Key -> slab slot
    index: HashMap<String, usize>,
    /// Slab of list nodes; `None` marks a free slot
    nodes: Vec<Option<Node<V>>>,
    /// Free slab slots available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    /// Allowed bytes
    max_bytes: u64,
    /// Sum of `key.len() + value.len()` over held entries
    used_bytes: u64,
    stats: CacheStats,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: Value> LruCache<V> {
    // == Constructor ==
    /// Creates an empty store allowed to hold `max_bytes`.
    ///
    /// A budget of zero is replaced by [`DEFAULT_MAX_BYTES`]; it does not
    /// mean "unbounded".
    pub fn new(max_bytes: u64, on_evicted: Option<EvictionCallback<V>>) -> Self {
        let max_bytes = if max_bytes == 0 {
            DEFAULT_MAX_BYTES
        } else {
            max_bytes
        };

        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            max_bytes,
            used_bytes: 0,
            stats: CacheStats::new(),
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let Some(&idx) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        self.stats.record_hit();
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    // == Contains ==
    /// Checks for a key without touching its recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Set ==
    /// Inserts or replaces a value, then evicts until back within budget.
    ///
    /// An overwrite moves the key to the most recently used position and
    /// adjusts the usage by the difference in value sizes.
    pub fn set(&mut self, key: String, value: V) {
        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            if let Some(node) = self.nodes[idx].as_mut() {
                let old_len = node.value.len() as u64;
                let new_len = value.len() as u64;
                node.value = value;
                self.used_bytes = self.used_bytes - old_len + new_len;
            }
        } else {
            self.used_bytes += (key.len() + value.len()) as u64;
            let idx = self.alloc(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
            self.index.insert(key, idx);
        }

        self.evict_to_budget();
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, then keeps evicting while the
    /// store is still over budget.
    pub fn remove_oldest(&mut self) {
        self.evict_one();
        self.evict_to_budget();
    }

    // == Accessors ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Returns the keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            match self.nodes[idx].as_ref() {
                Some(node) => {
                    keys.push(node.key.as_str());
                    cursor = node.next;
                }
                None => break,
            }
        }
        keys
    }

    /// Returns a snapshot of the store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats.set_bytes(self.used_bytes, self.max_bytes);
        stats
    }

    // == Eviction ==
    fn evict_to_budget(&mut self) {
        while self.used_bytes > self.max_bytes && self.evict_one() {}
    }

    /// Removes the tail entry. Returns false when the store is empty.
    fn evict_one(&mut self) -> bool {
        let Some(idx) = self.tail else {
            return false;
        };

        self.unlink(idx);
        let Some(node) = self.nodes[idx].take() else {
            return false;
        };
        self.free.push(idx);
        self.index.remove(&node.key);
        self.used_bytes -= (node.key.len() + node.value.len()) as u64;
        self.stats.record_eviction();

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&node.key, &node.value);
        }
        true
    }

    // == List Maintenance ==
    fn alloc(&mut self, node: Node<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(head) = old_head {
            if let Some(node) = self.nodes[head].as_mut() {
                node.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.nodes[idx].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.nodes[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.index.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("stats", &self.stats)
            .finish()
    }
}
