//! Phase A: unauthenticated bootstrap info query over UDP.

use crate::error::PhaseError;
use crate::model::NodeRecord;
use crate::protocol::{BOOTSTRAP_INFO_HEADER_LENGTH, BootstrapInfo, decode_info_response, info_request};
use crate::transport::Transport;

/// Ask the node for its version and MOTD.
pub async fn query(
    transport: &Transport,
    node: &NodeRecord,
    max_motd_length: usize,
) -> Result<BootstrapInfo, PhaseError> {
    let channel = transport.open_datagram(&node.ipv4, node.port).await?;
    channel.send(&info_request()).await?;

    let mut buffer = vec![0u8; BOOTSTRAP_INFO_HEADER_LENGTH + max_motd_length];
    let read = channel.recv(&mut buffer).await?;
    decode_info_response(&buffer[..read], max_motd_length)
}
