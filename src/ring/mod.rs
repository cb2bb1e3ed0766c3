//! Ring Module
//!
//! Consistent hashing used to pick the node that owns a key.

mod hash_ring;
mod node;

pub use hash_ring::{ring_hash, HashRing};
pub use node::{Node, NodeAddress};
