//! Phase B: encrypted get-nodes query over UDP.
//!
//! Any reply that can be read without error counts as success. The reply's
//! packet id and content are not checked.

use crate::crypto::{CryptoProvider, PUBLIC_KEY_SIZE};
use crate::error::PhaseError;
use crate::model::NodeRecord;
use crate::protocol::discovery_request;
use crate::transport::Transport;

/// Send a get-nodes request and wait for any reply.
pub async fn query(
    transport: &Transport,
    crypto: &dyn CryptoProvider,
    node: &NodeRecord,
    node_public_key: &[u8; PUBLIC_KEY_SIZE],
    max_packet_size: usize,
) -> Result<usize, PhaseError> {
    let payload = discovery_request(crypto, node_public_key)?;

    let channel = transport.open_datagram(&node.ipv4, node.port).await?;
    channel.send(&payload).await?;

    let mut buffer = vec![0u8; max_packet_size];
    channel.recv(&mut buffer).await
}
