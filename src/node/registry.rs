//! Node Registry
//!
//! Optional process-wide handle to "the" cache node. Nodes work without it;
//! it exists for code that cannot have the node passed in explicitly.

use std::sync::Arc;

use parking_lot::RwLock;

use super::CacheNode;

static CURRENT: RwLock<Option<Arc<CacheNode>>> = parking_lot::const_rwlock(None);

/// Makes `node` the globally reachable node, returning the one it replaces.
/// The replaced node is not torn down.
pub fn install(node: Arc<CacheNode>) -> Option<Arc<CacheNode>> {
    CURRENT.write().replace(node)
}

/// Returns the globally reachable node, if any.
pub fn current() -> Option<Arc<CacheNode>> {
    CURRENT.read().clone()
}

/// Removes the globally reachable node.
pub fn clear() -> Option<Arc<CacheNode>> {
    CURRENT.write().take()
}
