//! Cluster Module
//!
//! Ownership routing, request forwarding and write replication between nodes.

mod coordinator;
mod peer;

pub use coordinator::{Coordinator, Reply, Route};
pub use peer::{replication_payload, PeerClient, RelayedResponse};

/// Marks a write as a replica copy so the receiver does not fan it out again.
pub const REPLICATION_HEADER: &str = "x-replication";

/// Comma-separated ids of the nodes that already forwarded a request.
pub const FORWARDED_BY_HEADER: &str = "x-forwarded-for";
