//! Hash Ring Module
//!
//! Consistent-hash ring mapping keys to cluster members.
//!
//! Each node occupies a single position on a 32-bit circle. A key belongs to
//! the first node at or clockwise from the key's own position.

use parking_lot::RwLock;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::RingError;
use crate::ring::Node;

// == Ring Hash ==
/// Position on the ring for a node id or key.
///
/// First four bytes of the SHA-1 digest, big-endian.
pub fn ring_hash(input: &str) -> u32 {
    let digest = Sha1::digest(input.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

// == Hash Ring ==
#[derive(Debug, Clone)]
struct RingPoint {
    hash: u32,
    node: Node,
}

/// Thread-safe consistent-hash ring.
///
/// Points are kept in one vector sorted ascending by hash.
#[derive(Debug, Default)]
pub struct HashRing {
    points: RwLock<Vec<RingPoint>>,
}

impl HashRing {
    // == Constructors ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ring from `nodes`, failing on the first rejected node.
    pub fn with_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, RingError> {
        let ring = Self::new();
        for node in nodes {
            ring.add_node(node)?;
        }
        Ok(ring)
    }

    // == Membership ==
    /// Places `node` on the ring.
    ///
    /// Rejects a node whose id is already present, or whose position is
    /// already taken by a different node.
    pub fn add_node(&self, node: Node) -> Result<(), RingError> {
        let hash = ring_hash(&node.id);
        let mut points = self.points.write();

        if points.iter().any(|p| p.node.id == node.id) {
            return Err(RingError::DuplicateNode(node.id));
        }

        match points.binary_search_by_key(&hash, |p| p.hash) {
            Ok(idx) => Err(RingError::Collision {
                hash,
                existing: points[idx].node.id.clone(),
                rejected: node.id,
            }),
            Err(idx) => {
                debug!(node = %node, hash, "Node added to ring");
                points.insert(idx, RingPoint { hash, node });
                Ok(())
            }
        }
    }

    /// Removes the node with `node_id`, returning it if it was present.
    pub fn remove_node(&self, node_id: &str) -> Option<Node> {
        let mut points = self.points.write();
        let idx = points.iter().position(|p| p.node.id == node_id)?;
        let removed = points.remove(idx);
        debug!(node = %removed.node, "Node removed from ring");
        Some(removed.node)
    }

    // == Lookup ==
    /// Owner of `key`: the first node with position >= hash(key), wrapping
    /// to the lowest position. `None` when the ring is empty.
    pub fn get_node(&self, key: &str) -> Option<Node> {
        let hash = ring_hash(key);
        let points = self.points.read();
        if points.is_empty() {
            return None;
        }

        let idx = points.partition_point(|p| p.hash < hash);
        let idx = if idx == points.len() { 0 } else { idx };
        Some(points[idx].node.clone())
    }

    /// Members in ring order.
    pub fn nodes(&self) -> Vec<Node> {
        self.points.read().iter().map(|p| p.node.clone()).collect()
    }

    /// Ring positions paired with their node ids, ascending.
    pub fn positions(&self) -> Vec<(u32, String)> {
        self.points
            .read()
            .iter()
            .map(|p| (p.hash, p.node.id.clone()))
            .collect()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.points.read().iter().any(|p| p.node.id == node_id)
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }
}
