//! Node Module
//!
//! Describes a cluster member: its identifier and how to reach it.

use std::fmt;

use serde::Serialize;

// == Node Address ==
/// Where a node can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum NodeAddress {
    /// This process. Never dialled.
    Local,
    /// Base URL of a peer, e.g. `http://10.0.0.2:8080`.
    Remote(String),
}

// == Node ==
/// A ring member: a stable identifier plus how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    pub id: String,
    pub address: NodeAddress,
}

impl Node {
    /// The node representing this process.
    pub fn local(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: NodeAddress::Local,
        }
    }

    /// A peer reachable at `url`.
    pub fn remote(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: NodeAddress::Remote(url.into()),
        }
    }

    /// A peer whose identifier is its own base URL.
    pub fn peer(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::remote(url.clone(), url)
    }

    pub fn is_local(&self) -> bool {
        matches!(self.address, NodeAddress::Local)
    }

    /// Base URL for remote nodes.
    pub fn url(&self) -> Option<&str> {
        match &self.address {
            NodeAddress::Local => None,
            NodeAddress::Remote(url) => Some(url),
        }
    }
}

// == Display ==
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            NodeAddress::Local => write!(f, "{} (self)", self.id),
            NodeAddress::Remote(url) if *url == self.id => f.write_str(url),
            NodeAddress::Remote(url) => write!(f, "{} @ {}", self.id, url),
        }
    }
}
