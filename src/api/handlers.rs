//! API Handlers
//!
//! HTTP request handlers for each cache shard endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::cluster::{Coordinator, Reply};
use crate::config::Config;
use crate::error::{CacheError, ClusterError, Result};
use crate::models::{GetQuery, GetResponse, HealthResponse, SetRequest, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
}

impl AppState {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ClusterError> {
        Ok(Self::new(Coordinator::from_config(config)?))
    }
}

/// Handler for POST /set
///
/// The body is captured whole so it can be forwarded unchanged when another
/// node owns the key. Success is an empty 200.
pub async fn set_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let req: SetRequest = serde_json::from_slice(&body)
        .map_err(|err| CacheError::InvalidRequest(err.to_string()))?;

    match state.coordinator.handle_set(req, &headers, &uri, body).await? {
        Reply::Local(()) => Ok(StatusCode::OK.into_response()),
        Reply::Relayed(relayed) => Ok(relayed.into_response()),
    }
}

/// Handler for GET /get?key=...
pub async fn get_handler(
    State(state): State<AppState>,
    Query(query): Query<GetQuery>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response> {
    match state.coordinator.handle_get(query.key, &headers, &uri).await? {
        Reply::Local(value) => Ok(Json(GetResponse::new(value)).into_response()),
        Reply::Relayed(relayed) => Ok(relayed.into_response()),
    }
}

/// Handler for GET /stats
///
/// Reports this node's local store and its view of the ring.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let coordinator = &state.coordinator;
    let (stats, capacity) = {
        let store = coordinator.store();
        let guard = store.read().await;
        (guard.stats(), guard.capacity())
    };

    Json(StatsResponse::new(
        coordinator.self_id(),
        coordinator.ring().nodes(),
        capacity,
        &stats,
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.coordinator.self_id()))
}
