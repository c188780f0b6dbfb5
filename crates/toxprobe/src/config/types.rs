//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Status server listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8081 }
    }
}

/// Rescan loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Pause between the end of one scan and the start of the next
    pub interval_seconds: u64,

    /// `http(s)://` URI or path of the node directory
    pub directory_source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_nodes: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            directory_source: "https://wiki.tox.chat/users/nodes?do=export_raw".into(),
            max_concurrent_nodes: None,
        }
    }
}

/// Per-node probe parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_motd_length: usize,
    pub max_udp_packet_size: usize,

    /// Well-known TCP relay ports, tried on every node besides its own port
    pub tcp_ports: Vec<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_ports: Option<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 2000,
            read_timeout_ms: 4000,
            max_motd_length: crate::protocol::MAX_MOTD_LENGTH,
            max_udp_packet_size: crate::protocol::MAX_UDP_PACKET_SIZE,
            tcp_ports: vec![443, 3389, 33445],
            max_concurrent_ports: None,
        }
    }
}
