//! Response DTOs for the cache shard API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::ring::Node;

/// Response body for the GET operation (GET /get?key=...)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The stored value
    pub value: String,
}

impl GetResponse {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Identifier of the answering node
    pub node_id: String,
    /// Number of members on this node's ring
    pub ring_size: usize,
    /// Ring members in ring order
    pub ring: Vec<Node>,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Number of entries dropped on expiry
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(node_id: impl Into<String>, ring: Vec<Node>, capacity: usize, stats: &CacheStats) -> Self {
        Self {
            node_id: node_id.into(),
            ring_size: ring.len(),
            ring,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            capacity,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Identifier of the answering node
    pub node_id: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(node_id: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            node_id: node_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let json = serde_json::to_string(&GetResponse::new("1")).unwrap();
        assert_eq!(json, r#"{"value":"1"}"#);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            expirations: 2,
            total_entries: 10,
        };
        let ring = vec![Node::local("n1"), Node::peer("http://b:2"), Node::peer("http://c:3")];
        let resp = StatsResponse::new("n1", ring, 10, &stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.ring_size, 3);
        assert_eq!(resp.expirations, 2);
    }

    #[test]
    fn test_stats_response_lists_ring_members() {
        let ring = vec![Node::local("n1"), Node::peer("http://b:2")];
        let json = serde_json::to_value(StatsResponse::new("n1", ring, 10, &CacheStats::default())).unwrap();

        assert_eq!(json["ring_size"], 2);
        assert_eq!(json["ring"][0]["id"], "n1");
        assert_eq!(json["ring"][0]["address"]["kind"], "local");
        assert_eq!(json["ring"][1]["address"]["kind"], "remote");
        assert_eq!(json["ring"][1]["address"]["url"], "http://b:2");
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy("n1")).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
        assert!(json.contains("n1"));
    }
}
