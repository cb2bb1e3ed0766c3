//! Request and Response models for the cache shard API
//!
//! DTOs for HTTP bodies and query strings, shared by client-facing and
//! peer-to-peer traffic.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{GetQuery, SetRequest};
pub use responses::{GetResponse, HealthResponse, StatsResponse};
