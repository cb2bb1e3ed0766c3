//! Error types for the cache shard
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent or expired. A normal outcome rather than a fault.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Malformed or invalid client input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request already passed through this node
    #[error("loop detected: request already forwarded by {0}")]
    LoopDetected(String),

    /// The owning peer could not be reached
    #[error("Upstream {node} unavailable: {message}")]
    Upstream { node: String, message: String },

    /// The ring has no members to own the key
    #[error("No owner for key: {0}")]
    NoOwner(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    pub fn status(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::LoopDetected(_) => StatusCode::BAD_REQUEST,
            CacheError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            CacheError::NoOwner(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Ring Errors ==
/// Membership changes the ring refuses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("node {0} is already on the ring")]
    DuplicateNode(String),

    #[error("node {rejected} collides with {existing} at ring position {hash:#010x}")]
    Collision {
        hash: u32,
        existing: String,
        rejected: String,
    },
}

// == Startup Errors ==
/// Failures while assembling a coordinator.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("invalid cluster membership: {0}")]
    Ring(#[from] RingError),

    #[error("failed to build peer HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache shard.
pub type Result<T> = std::result::Result<T, CacheError>;
