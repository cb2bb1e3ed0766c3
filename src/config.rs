//! Configuration Module
//!
//! Server configuration from command-line flags, each with an environment
//! variable fallback.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Configuration the startup path refuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Server configuration parameters.
#[derive(Debug, Clone, Parser)]
#[command(name = "shard_cache", about = "Partitioned in-memory cache shard", version)]
pub struct Config {
    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Comma-separated base URLs of the other cluster members
    #[arg(long, env = "PEERS", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// This node's identifier; defaults to http://127.0.0.1:<port>
    #[arg(long, env = "NODE_ID")]
    pub node_id: Option<String>,

    /// Maximum number of entries held by this node
    #[arg(long, env = "CACHE_CAPACITY", default_value_t = 10)]
    pub capacity: usize,

    /// TTL in seconds applied when a write does not carry one
    #[arg(long, env = "DEFAULT_TTL", default_value_t = 3600)]
    pub default_ttl: u64,

    /// Seconds between background expiry sweeps
    #[arg(long, env = "CLEANUP_INTERVAL", default_value_t = 60)]
    pub cleanup_interval: u64,

    /// Seconds allowed for establishing a connection to a peer
    #[arg(long, env = "PEER_CONNECT_TIMEOUT", default_value_t = 5)]
    pub connect_timeout: u64,
}

impl Config {
    /// Parses process arguments and environment.
    pub fn load() -> Self {
        Self::parse()
    }

    /// Rejects settings the cache cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Zero("capacity"));
        }
        if self.default_ttl == 0 {
            return Err(ConfigError::Zero("default_ttl"));
        }
        if self.cleanup_interval == 0 {
            return Err(ConfigError::Zero("cleanup_interval"));
        }
        if self.connect_timeout == 0 {
            return Err(ConfigError::Zero("connect_timeout"));
        }
        Ok(())
    }

    /// Identifier this node uses on the ring and in loop detection.
    pub fn self_id(&self) -> String {
        self.node_id
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", self.port))
    }

    /// Peer base URLs, trimmed, without trailing slashes or blanks.
    pub fn peer_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for peer in &self.peers {
            let url = peer.trim().trim_end_matches('/');
            if !url.is_empty() && !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
        urls
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            peers: Vec::new(),
            node_id: None,
            capacity: 10,
            default_ttl: 3600,
            cleanup_interval: 60,
            connect_timeout: 5,
        }
    }
}
