//! Peer Client Module
//!
//! HTTP client for node-to-node traffic: forwarding requests to a key's
//! owner and pushing replication writes.

use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::cluster::REPLICATION_HEADER;
use crate::error::{CacheError, Result};
use crate::models::SetRequest;
use crate::ring::Node;

/// Headers that describe a single connection and must not be copied.
const HOP_BY_HOP: [HeaderName; 6] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::UPGRADE,
];

// == Relayed Response ==
/// A peer's answer, relayed verbatim to the requesting client.
#[derive(Debug, Clone)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(content_type) => {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        response
    }
}

// == Peer Client ==
/// Shared connection pool for forwarding and replication.
#[derive(Debug, Clone)]
pub struct PeerClient {
    client: reqwest::Client,
}

impl PeerClient {
    /// Builds a client that gives up connecting after `connect_timeout`.
    /// Requests themselves carry no deadline.
    pub fn new(connect_timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }

    // == Forwarding ==
    /// Re-issues a request against `node` and captures its response.
    ///
    /// `path_and_query` is appended to the node's base URL unchanged.
    pub async fn forward(
        &self,
        node: &Node,
        method: Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<RelayedResponse> {
        let base = node.url().ok_or_else(|| {
            CacheError::Internal(format!("cannot forward to local node {}", node.id))
        })?;
        let url = format!("{base}{path_and_query}");
        let upstream = |err: reqwest::Error| CacheError::Upstream {
            node: node.id.clone(),
            message: err.to_string(),
        };

        let mut request = self
            .client
            .request(method, &url)
            .headers(end_to_end(headers));
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await.map_err(upstream)?;
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(upstream)?;

        Ok(RelayedResponse {
            status,
            content_type,
            body,
        })
    }

    // == Replication ==
    /// Sends a replication write to `node`'s `/set`.
    ///
    /// A non-2xx answer counts as a failure.
    pub async fn replicate(&self, node: &Node, payload: Bytes) -> Result<()> {
        let base = node.url().ok_or_else(|| {
            CacheError::Internal(format!("cannot replicate to local node {}", node.id))
        })?;

        let response = self
            .client
            .post(format!("{base}/set"))
            .header(header::CONTENT_TYPE, "application/json")
            .header(REPLICATION_HEADER, "true")
            .body(payload)
            .send()
            .await
            .map_err(|err| CacheError::Upstream {
                node: node.id.clone(),
                message: err.to_string(),
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CacheError::Upstream {
                node: node.id.clone(),
                message: format!("replication rejected with {}", response.status()),
            })
        }
    }
}

// == Helpers ==
/// Serializes a replication write body.
pub fn replication_payload(key: &str, value: &str, ttl: Duration) -> Result<Bytes> {
    let request = SetRequest {
        key: key.to_string(),
        value: value.to_string(),
        ttl: Some(ttl.as_secs().max(1)),
    };
    serde_json::to_vec(&request)
        .map(Bytes::from)
        .map_err(|err| CacheError::Internal(err.to_string()))
}

fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in &HOP_BY_HOP {
        out.remove(name);
    }
    out
}
