//! Consistent Hash Ring
//!
//! Maps keys to owning nodes. Each node is placed on the ring at
//! `replicas` virtual positions so that load spreads evenly even with few
//! physical nodes.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Hash function placing keys and virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// CRC-32 (IEEE) checksum, the default ring hash.
pub fn crc32_ieee(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// == Hash Ring ==
/// Consistent-hash ring of node identifiers.
///
/// The ring has no internal lock. It is built during cluster setup and read
/// afterwards; callers that change membership at runtime must synchronize
/// access themselves.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    /// Virtual positions per physical node
    replicas: usize,
    /// Ring positions, sorted ascending
    positions: Vec<u32>,
    /// Position -> owning node
    owners: HashMap<u32, String>,
    /// Physical nodes in the order they were added
    nodes: Vec<String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring. `hash` defaults to [`crc32_ieee`].
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32_ieee),
            replicas,
            positions: Vec::new(),
            owners: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    // == Add ==
    /// Places each node on the ring at `replicas` virtual positions.
    ///
    /// Virtual position `i` of node `n` is `hash("{i}{n}")`. Colliding
    /// positions are not deduplicated; the last node placed owns them.
    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for node in nodes {
            let node = node.into();
            self.place(&node);
            self.nodes.push(node);
        }
        self.positions.sort_unstable();
    }

    // == Remove ==
    /// Removes a node by rebuilding the ring from the remaining members.
    ///
    /// Rebuilding gives the same placement as a fresh ring built with the
    /// remaining nodes, including ownership of colliding positions.
    /// Returns false when the node was never added.
    pub fn remove(&mut self, node: &str) -> bool {
        if !self.nodes.iter().any(|n| n == node) {
            return false;
        }

        let remaining: Vec<String> = self.nodes.drain(..).filter(|n| n != node).collect();
        self.positions.clear();
        self.owners.clear();
        self.add(remaining);
        debug!(node, "removed node from hash ring");
        true
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` when the ring is empty.
    ///
    /// The owner is the node at the first position at or after
    /// `hash(key)`, wrapping around to the smallest position.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.positions.partition_point(|&p| p < hash);
        let position = self.positions[idx % self.positions.len()];
        self.owners.get(&position).map(String::as_str)
    }

    // == Accessors ==
    /// Returns the physical nodes in insertion order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Returns the number of virtual positions on the ring.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn place(&mut self, node: &str) {
        for i in 0..self.replicas {
            let position = (self.hash)(format!("{}{}", i, node).as_bytes());
            self.positions.push(position);
            self.owners.insert(position, node.to_string());
        }
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .field("nodes", &self.nodes)
            .finish()
    }
}
