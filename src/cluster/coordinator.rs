//! Coordinator Module
//!
//! Request routing and replication.
//!
//! Every operation first asks the ring who owns the key. Owned keys are
//! served from the local store; writes to owned keys are then fanned out to
//! every peer in the background. Keys owned elsewhere are forwarded to the
//! owner and its response is relayed back.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderValue, Method, Uri},
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::cluster::peer::{replication_payload, PeerClient, RelayedResponse};
use crate::cluster::{FORWARDED_BY_HEADER, REPLICATION_HEADER};
use crate::config::Config;
use crate::error::{CacheError, ClusterError, Result, RingError};
use crate::models::requests::validate_key;
use crate::models::SetRequest;
use crate::ring::{HashRing, Node};

/// Where an operation on a key is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Local,
    Remote(Node),
}

/// Result of an operation: produced here, or relayed from the owner.
#[derive(Debug)]
pub enum Reply<T> {
    Local(T),
    Relayed(RelayedResponse),
}

/// Owns this node's store and ring and decides where each request runs.
#[derive(Debug)]
pub struct Coordinator {
    self_id: String,
    store: Arc<RwLock<CacheStore>>,
    ring: HashRing,
    /// Replication targets: every remote ring member except self.
    peers: Vec<Node>,
    client: PeerClient,
    default_ttl: Duration,
}

impl Coordinator {
    /// Builds a coordinator whose ring holds self plus one node per peer URL.
    ///
    /// A peer URL equal to `self_id` denotes this node and is not added twice.
    pub fn new(
        self_id: impl Into<String>,
        peer_urls: &[String],
        store: CacheStore,
        client: PeerClient,
        default_ttl: Duration,
    ) -> std::result::Result<Self, RingError> {
        let self_id = self_id.into();
        let ring = HashRing::new();
        ring.add_node(Node::local(self_id.clone()))?;
        for url in peer_urls.iter().filter(|url| **url != self_id) {
            ring.add_node(Node::peer(url.clone()))?;
        }
        Ok(Self::with_ring(self_id, ring, store, client, default_ttl))
    }

    /// Uses an already populated ring. Replication targets are its remote
    /// members other than `self_id`.
    pub fn with_ring(
        self_id: impl Into<String>,
        ring: HashRing,
        store: CacheStore,
        client: PeerClient,
        default_ttl: Duration,
    ) -> Self {
        let self_id = self_id.into();
        let peers = ring
            .nodes()
            .into_iter()
            .filter(|node| !node.is_local() && node.id != self_id)
            .collect();

        Self {
            self_id,
            store: Arc::new(RwLock::new(store)),
            ring,
            peers,
            client,
            default_ttl,
        }
    }

    /// Assembles a coordinator from validated configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ClusterError> {
        let client = PeerClient::new(config.connect_timeout())?;
        let coordinator = Self::new(
            config.self_id(),
            &config.peer_urls(),
            CacheStore::new(config.capacity),
            client,
            config.default_ttl(),
        )?;
        info!(
            node_id = %coordinator.self_id,
            peers = coordinator.peers.len(),
            "Coordinator ready"
        );
        Ok(coordinator)
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Shared handle to the local store, e.g. for the expiry sweep.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.store)
    }

    pub fn ring(&self) -> &HashRing {
        &self.ring
    }

    pub fn peers(&self) -> &[Node] {
        &self.peers
    }

    // == Routing ==
    /// Decides whether `key` is served here or by a peer.
    pub fn route(&self, key: &str) -> Result<Route> {
        let owner = self
            .ring
            .get_node(key)
            .ok_or_else(|| CacheError::NoOwner(key.to_string()))?;

        if owner.is_local() || owner.id == self.self_id {
            Ok(Route::Local)
        } else {
            Ok(Route::Remote(owner))
        }
    }

    // == Set ==
    /// Handles a write.
    ///
    /// Replication writes are applied locally whatever the ring says, and
    /// never fan out again. Client writes go to the owner; the owner stores
    /// the value, starts replication and answers without waiting for it.
    pub async fn handle_set(
        &self,
        req: SetRequest,
        headers: &HeaderMap,
        uri: &Uri,
        raw_body: Bytes,
    ) -> Result<Reply<()>> {
        if let Some(msg) = req.validate() {
            return Err(CacheError::InvalidRequest(msg));
        }
        let ttl = req
            .ttl
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);

        if is_replication(headers) {
            debug!(key = %req.key, "Applying replicated write");
            self.store.write().await.set(req.key, req.value, ttl);
            return Ok(Reply::Local(()));
        }

        match self.route(&req.key)? {
            Route::Local => {
                debug!(key = %req.key, "Storing owned key");
                self.store
                    .write()
                    .await
                    .set(req.key.clone(), req.value.clone(), ttl);
                self.replicate(&req.key, &req.value, ttl);
                Ok(Reply::Local(()))
            }
            Route::Remote(owner) => {
                let headers = self.stamp_forwarded(headers)?;
                debug!(key = %req.key, owner = %owner, "Forwarding set");
                let relayed = self
                    .client
                    .forward(&owner, Method::POST, path_and_query(uri), &headers, raw_body)
                    .await
                    .inspect_err(|err| warn!(owner = %owner, error = %err, "Forwarding set failed"))?;
                Ok(Reply::Relayed(relayed))
            }
        }
    }

    // == Get ==
    /// Handles a read, serving owned keys locally and forwarding the rest.
    pub async fn handle_get(
        &self,
        key: Option<String>,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Result<Reply<String>> {
        let key = key.unwrap_or_default();
        if let Some(msg) = validate_key(&key) {
            return Err(CacheError::InvalidRequest(msg));
        }

        match self.route(&key)? {
            Route::Local => {
                let value = self.store.write().await.get(&key);
                value
                    .map(Reply::Local)
                    .ok_or(CacheError::NotFound(key))
            }
            Route::Remote(owner) => {
                let headers = self.stamp_forwarded(headers)?;
                debug!(key = %key, owner = %owner, "Forwarding get");
                let relayed = self
                    .client
                    .forward(&owner, Method::GET, path_and_query(uri), &headers, Bytes::new())
                    .await
                    .inspect_err(|err| warn!(owner = %owner, error = %err, "Forwarding get failed"))?;
                Ok(Reply::Relayed(relayed))
            }
        }
    }

    // == Replication ==
    /// Starts one detached write per peer and returns how many were started.
    ///
    /// Each task owns its copy of the payload. Failures are logged and never
    /// retried.
    pub fn replicate(&self, key: &str, value: &str, ttl: Duration) -> usize {
        if self.peers.is_empty() {
            return 0;
        }

        let payload = match replication_payload(key, value, ttl) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, error = %err, "Could not encode replication payload");
                return 0;
            }
        };

        for peer in &self.peers {
            let client = self.client.clone();
            let peer = peer.clone();
            let payload = payload.clone();
            let key = key.to_string();
            tokio::spawn(async move {
                match client.replicate(&peer, payload).await {
                    Ok(()) => debug!(key = %key, peer = %peer, "Replicated write"),
                    Err(err) => warn!(key = %key, peer = %peer, error = %err, "Replication failed"),
                }
            });
        }
        self.peers.len()
    }

    // == Loop Detection ==
    /// Returns `headers` with this node appended to the forwarding chain, or
    /// `LoopDetected` if the chain already contains it.
    ///
    /// Repeated headers are merged into one chain. A value that is not
    /// plain text is rejected rather than dropped, so no hop is lost.
    pub fn stamp_forwarded(&self, headers: &HeaderMap) -> Result<HeaderMap> {
        let hops = headers
            .get_all(FORWARDED_BY_HEADER)
            .iter()
            .map(|value| {
                value.to_str().map_err(|_| {
                    CacheError::InvalidRequest(format!(
                        "{FORWARDED_BY_HEADER} header is not valid text"
                    ))
                })
            })
            .collect::<Result<Vec<&str>>>()?;
        let joined = hops.join(", ");
        let chain = joined.as_str();

        if forwarding_chain(chain).any(|hop| hop == self.self_id) {
            warn!(node_id = %self.self_id, chain, "Forwarding loop detected");
            return Err(CacheError::LoopDetected(self.self_id.clone()));
        }

        let stamped = if chain.trim().is_empty() {
            self.self_id.clone()
        } else {
            format!("{chain}, {}", self.self_id)
        };
        let value = HeaderValue::from_str(&stamped)
            .map_err(|err| CacheError::Internal(format!("invalid node id in header: {err}")))?;

        let mut out = headers.clone();
        out.insert(FORWARDED_BY_HEADER, value);
        Ok(out)
    }
}

fn is_replication(headers: &HeaderMap) -> bool {
    headers
        .get(REPLICATION_HEADER)
        .is_some_and(|value| !value.is_empty())
}

fn forwarding_chain(chain: &str) -> impl Iterator<Item = &str> {
    chain.split(',').map(str::trim).filter(|hop| !hop.is_empty())
}

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}
