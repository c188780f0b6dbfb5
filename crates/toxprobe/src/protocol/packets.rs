//! Packet builders and decoders.

use crate::crypto::{BOX_ZERO_BYTES, CryptoProvider, NONCE_SIZE, PUBLIC_KEY_SIZE};
use crate::error::{CryptoError, PhaseError};

use super::{
    BOOTSTRAP_INFO_HEADER_LENGTH, BOOTSTRAP_INFO_PACKET_ID, BOOTSTRAP_INFO_PACKET_LENGTH,
    GET_NODES_PACKET_ID, PING_ID_SIZE, TCP_HANDSHAKE_PACKET_LENGTH,
};

/// Version and MOTD reported by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapInfo {
    pub version: String,
    pub motd: String,
}

/// `[240][zeros]`, fixed length.
pub fn info_request() -> [u8; BOOTSTRAP_INFO_PACKET_LENGTH] {
    let mut payload = [0u8; BOOTSTRAP_INFO_PACKET_LENGTH];
    payload[0] = BOOTSTRAP_INFO_PACKET_ID;
    payload
}

/// Decode an info response: `[240][u32 BE version][motd]`.
///
/// Trailing zero bytes of the MOTD are dropped and it is capped at
/// `max_motd_length` bytes.
pub fn decode_info_response(
    packet: &[u8],
    max_motd_length: usize,
) -> Result<BootstrapInfo, PhaseError> {
    match packet.first() {
        Some(&BOOTSTRAP_INFO_PACKET_ID) => {}
        Some(&id) => return Err(PhaseError::UnexpectedPacketId(id)),
        None => return Err(PhaseError::InfoTooShort(0)),
    }

    if packet.len() < BOOTSTRAP_INFO_HEADER_LENGTH {
        return Err(PhaseError::InfoTooShort(packet.len()));
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&packet[1..BOOTSTRAP_INFO_HEADER_LENGTH]);

    let motd = &packet[BOOTSTRAP_INFO_HEADER_LENGTH..];
    let motd = &motd[..motd.len().min(max_motd_length)];
    let end = motd.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);

    Ok(BootstrapInfo {
        version: u32::from_be_bytes(version).to_string(),
        motd: String::from_utf8_lossy(&motd[..end]).into_owned(),
    })
}

/// Drop the NaCl zero prefix, keeping `tag || ciphertext`.
pub fn strip_box_prefix(mut boxed: Vec<u8>) -> Result<Vec<u8>, CryptoError> {
    if boxed.len() < BOX_ZERO_BYTES {
        return Err(CryptoError::MissingPrefix(BOX_ZERO_BYTES));
    }
    boxed.drain(..BOX_ZERO_BYTES);
    Ok(boxed)
}

/// Build a get-nodes request:
/// `[2][own pk][nonce][box(own pk + ping id)]`.
pub fn discovery_request(
    crypto: &dyn CryptoProvider,
    node_public_key: &[u8; PUBLIC_KEY_SIZE],
) -> Result<Vec<u8>, PhaseError> {
    let own_public_key = crypto.public_key();

    let mut plain = Vec::with_capacity(PUBLIC_KEY_SIZE + PING_ID_SIZE);
    plain.extend_from_slice(&own_public_key);
    plain.extend_from_slice(&crypto.random_bytes(PING_ID_SIZE));

    let nonce = crypto.nonce();
    let shared_key = crypto.shared_key(node_public_key);
    let encrypted = strip_box_prefix(crypto.encrypt(&shared_key, &nonce, &plain)?)?;

    let mut payload = Vec::with_capacity(1 + PUBLIC_KEY_SIZE + NONCE_SIZE + encrypted.len());
    payload.push(GET_NODES_PACKET_ID);
    payload.extend_from_slice(&own_public_key);
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&encrypted);
    Ok(payload)
}

/// Build a TCP relay handshake:
/// `[own pk][nonce][box(session pk + base nonce)]`, padded to the fixed length.
pub fn handshake_request(
    crypto: &dyn CryptoProvider,
    node_public_key: &[u8; PUBLIC_KEY_SIZE],
) -> Result<Vec<u8>, PhaseError> {
    let own_public_key = crypto.public_key();
    let nonce = crypto.nonce();
    let base_nonce = crypto.nonce();
    let session = crypto.generate_keypair()?;

    let mut plain = Vec::with_capacity(PUBLIC_KEY_SIZE + NONCE_SIZE);
    plain.extend_from_slice(&session.public_key());
    plain.extend_from_slice(&base_nonce);

    let shared_key = crypto.shared_key(node_public_key);
    let encrypted = strip_box_prefix(crypto.encrypt(&shared_key, &nonce, &plain)?)?;

    let mut payload = vec![0u8; TCP_HANDSHAKE_PACKET_LENGTH];
    payload[..PUBLIC_KEY_SIZE].copy_from_slice(&own_public_key);
    payload[PUBLIC_KEY_SIZE..PUBLIC_KEY_SIZE + NONCE_SIZE].copy_from_slice(&nonce);
    let start = PUBLIC_KEY_SIZE + NONCE_SIZE;
    let end = (start + encrypted.len()).min(TCP_HANDSHAKE_PACKET_LENGTH);
    payload[start..end].copy_from_slice(&encrypted[..end - start]);
    Ok(payload)
}
