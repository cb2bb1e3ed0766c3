//! API Module
//!
//! HTTP handlers and routing for the cache shard.
//!
//! # Endpoints
//! - `POST /set` - Store a key-value pair
//! - `GET /get?key=` - Retrieve a value by key
//! - `GET /stats` - Get local cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
