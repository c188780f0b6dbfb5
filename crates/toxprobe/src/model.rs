//! Node records and published snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NEVER;

/// Sentinel used when a node declares no IPv6 address.
pub const NO_IPV6: &str = "-";

/// One bootstrap node as listed in the directory, plus what the last probe
/// learned about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Hex-encoded long-term public key
    pub public_key: String,

    pub ipv4: String,

    /// IPv6 address or [`NO_IPV6`]
    pub ipv6: String,

    /// Primary (UDP) port, also a TCP candidate
    pub port: u16,

    /// TCP ports that completed a relay handshake during this scan
    pub tcp_ports: Vec<u16>,

    pub maintainer: String,
    pub location: String,

    /// Reported by the info query
    pub version: Option<String>,
    pub motd: Option<String>,

    /// True once the probe reached the TCP handshake phase
    pub status: bool,

    /// Unix seconds of the last successful probe, 0 when never probed
    pub last_ping: i64,
    pub last_ping_string: String,
}

impl NodeRecord {
    /// Create a record with no probe history.
    pub fn new(
        ipv4: impl Into<String>,
        ipv6: impl Into<String>,
        port: u16,
        public_key: impl Into<String>,
        maintainer: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            ipv4: ipv4.into(),
            ipv6: ipv6.into(),
            port,
            tcp_ports: Vec::new(),
            maintainer: maintainer.into(),
            location: location.into(),
            version: None,
            motd: None,
            status: false,
            last_ping: 0,
            last_ping_string: NEVER.to_string(),
        }
    }

    /// Copy ping history from the same node in a previous snapshot.
    pub fn carry_history_from(&mut self, previous: &NodeRecord) {
        self.last_ping = previous.last_ping;
        self.last_ping_string = previous.last_ping_string.clone();
    }

    /// Record a successful probe at `unix_seconds`.
    pub fn mark_probed(&mut self, unix_seconds: i64) {
        self.status = true;
        self.last_ping = unix_seconds;
        self.last_ping_string = render_timestamp(unix_seconds);
    }

    /// Add a port to the open set. The set only grows within a scan.
    pub fn add_open_port(&mut self, port: u16) {
        if !self.tcp_ports.contains(&port) {
            self.tcp_ports.push(port);
        }
    }

    /// TCP ports to try: the well-known set followed by the primary port
    /// when it is not already part of it.
    pub fn candidate_ports(&self, well_known: &[u16]) -> Vec<u16> {
        candidate_ports(well_known, self.port)
    }
}

/// Deduplicated union of the well-known ports and `primary`.
pub fn candidate_ports(well_known: &[u16], primary: u16) -> Vec<u16> {
    let mut ports = Vec::with_capacity(well_known.len() + 1);
    for &port in well_known.iter().chain(std::iter::once(&primary)) {
        if !ports.contains(&port) {
            ports.push(port);
        }
    }
    ports
}

/// Human readable form of a unix timestamp; 0 renders as "Never".
pub fn render_timestamp(unix_seconds: i64) -> String {
    if unix_seconds == 0 {
        return NEVER.to_string();
    }

    match DateTime::<Utc>::from_timestamp(unix_seconds, 0) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => NEVER.to_string(),
    }
}

/// One complete, immutable view of all nodes as of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Unix seconds when the scan finished, 0 before the first scan
    pub last_scan: i64,

    /// Nodes in directory order
    pub nodes: Arc<[NodeRecord]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Snapshot {
    pub fn new(last_scan: i64, nodes: Vec<NodeRecord>) -> Self {
        Self { last_scan, nodes: nodes.into() }
    }

    /// Snapshot published before the first scan completes.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn last_scan_string(&self) -> String {
        render_timestamp(self.last_scan)
    }

    /// Find a node by its hex public key.
    pub fn find(&self, public_key: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|node| node.public_key == public_key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
