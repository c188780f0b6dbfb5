//! Probe engine - runs the three probe phases against one node
//!
//! Phases run in order:
//! - A: bootstrap info query (version, MOTD), failure is only logged
//! - B: encrypted get-nodes query, failure ends the probe for this cycle
//! - C: TCP relay handshake on every candidate port, in parallel
//!
//! Reaching phase C marks the node as up, whatever the number of open ports.

pub mod discovery;
pub mod handshake;
pub mod info;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::crypto::{CryptoProvider, decode_public_key};
use crate::model::NodeRecord;
use crate::protocol::{MAX_MOTD_LENGTH, MAX_UDP_PACKET_SIZE};
use crate::transport::{Deadlines, Transport};

/// Knobs of a probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub deadlines: Deadlines,

    /// Well-known TCP relay ports tried on every node
    pub tcp_ports: Vec<u16>,

    pub max_motd_length: usize,
    pub max_udp_packet_size: usize,

    /// Cap on concurrent handshakes across all nodes; `None` = unbounded
    pub max_concurrent_ports: Option<usize>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            deadlines: Deadlines::default(),
            tcp_ports: vec![443, 3389, 33445],
            max_motd_length: MAX_MOTD_LENGTH,
            max_udp_packet_size: MAX_UDP_PACKET_SIZE,
            max_concurrent_ports: None,
        }
    }
}

impl From<&ProbeConfig> for ProbeSettings {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            deadlines: Deadlines {
                connect: std::time::Duration::from_millis(config.connect_timeout_ms),
                read: std::time::Duration::from_millis(config.read_timeout_ms),
            },
            tcp_ports: config.tcp_ports.clone(),
            max_motd_length: config.max_motd_length,
            max_udp_packet_size: config.max_udp_packet_size,
            max_concurrent_ports: config.max_concurrent_ports,
        }
    }
}

/// Probes nodes with a shared crypto identity.
pub struct ProbeEngine {
    crypto: Arc<dyn CryptoProvider>,
    transport: Transport,
    settings: ProbeSettings,
    port_limit: Option<Arc<Semaphore>>,
}

impl ProbeEngine {
    pub fn new(crypto: Arc<dyn CryptoProvider>, settings: ProbeSettings) -> Self {
        let port_limit = settings
            .max_concurrent_ports
            .map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))));
        Self { crypto, transport: Transport::new(settings.deadlines), settings, port_limit }
    }

    /// Run all phases against `node` and return it with whatever the phases
    /// managed to learn.
    pub async fn probe_node(&self, mut node: NodeRecord) -> NodeRecord {
        match info::query(&self.transport, &node, self.settings.max_motd_length).await {
            Ok(bootstrap_info) => {
                node.version = Some(bootstrap_info.version);
                node.motd = Some(bootstrap_info.motd);
            }
            Err(e) => debug!("Bootstrap info query to {}:{} failed: {}", node.ipv4, node.port, e),
        }

        let node_public_key = match decode_public_key(&node.public_key) {
            Ok(key) => key,
            Err(e) => {
                debug!("Skipping encrypted probes of {}: {}", node.ipv4, e);
                return node;
            }
        };

        if let Err(e) = discovery::query(
            &self.transport,
            self.crypto.as_ref(),
            &node,
            &node_public_key,
            self.settings.max_udp_packet_size,
        )
        .await
        {
            debug!("Get-nodes query to {}:{} failed: {}", node.ipv4, node.port, e);
            return node;
        }

        let ports = node.candidate_ports(&self.settings.tcp_ports);
        let open = handshake::probe_ports(
            self.transport,
            self.crypto.clone(),
            &node.ipv4,
            &ports,
            node_public_key,
            self.port_limit.clone(),
        )
        .await;

        for port in open {
            node.add_open_port(port);
        }
        node.mark_probed(Utc::now().timestamp());

        debug!(
            "Node {} is up (version {}, tcp ports {:?})",
            node.ipv4,
            node.version.as_deref().unwrap_or("unknown"),
            node.tcp_ports
        );
        node
    }
}
