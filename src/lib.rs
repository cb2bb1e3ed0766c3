//! Shard Cache - a partitioned in-memory cache node
//!
//! Each node keeps a bounded TTL/LRU store, owns the keys a consistent-hash
//! ring assigns to it, forwards the rest to their owners and replicates its
//! own writes to every peer.

pub mod api;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod models;
pub mod ring;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cluster::Coordinator;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
