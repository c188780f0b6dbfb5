//! Serializable view of a snapshot, as served by the status endpoints.

use serde::{Deserialize, Serialize};

use crate::model::{NodeRecord, Snapshot};

/// Status of the whole network as of the last scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub last_scan: i64,
    pub last_scan_string: String,
    pub nodes: Vec<NodeStatus>,
}

/// Status of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub ipv4: String,
    pub ipv6: String,
    pub port: u16,
    pub tcp_ports: Vec<u16>,
    pub public_key: String,
    pub maintainer: String,
    pub location: String,
    pub status: bool,
    /// Empty when the node did not answer the info query
    pub version: String,
    pub motd: String,
    pub last_ping: i64,
    pub last_ping_string: String,
}

impl From<&NodeRecord> for NodeStatus {
    fn from(node: &NodeRecord) -> Self {
        Self {
            ipv4: node.ipv4.clone(),
            ipv6: node.ipv6.clone(),
            port: node.port,
            tcp_ports: node.tcp_ports.clone(),
            public_key: node.public_key.clone(),
            maintainer: node.maintainer.clone(),
            location: node.location.clone(),
            status: node.status,
            version: node.version.clone().unwrap_or_default(),
            motd: node.motd.clone().unwrap_or_default(),
            last_ping: node.last_ping,
            last_ping_string: node.last_ping_string.clone(),
        }
    }
}

impl From<&Snapshot> for StatusReport {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            last_scan: snapshot.last_scan,
            last_scan_string: snapshot.last_scan_string(),
            nodes: snapshot.nodes.iter().map(NodeStatus::from).collect(),
        }
    }
}

impl StatusReport {
    pub fn online(&self) -> usize {
        self.nodes.iter().filter(|node| node.status).count()
    }
}
