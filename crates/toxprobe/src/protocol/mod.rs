//! Wire format of the packets exchanged with bootstrap nodes.

pub mod packets;

pub use packets::{
    BootstrapInfo, decode_info_response, discovery_request, handshake_request, info_request,
    strip_box_prefix,
};

/// Packet id of a DHT get-nodes request.
pub const GET_NODES_PACKET_ID: u8 = 2;

/// Packet id of a DHT send-nodes (IPv6) response. Responses are not
/// validated against it.
pub const SEND_NODES_IPV6_PACKET_ID: u8 = 4;

/// Packet id of the bootstrap info request and response.
pub const BOOTSTRAP_INFO_PACKET_ID: u8 = 240;

/// Fixed length of the bootstrap info request.
pub const BOOTSTRAP_INFO_PACKET_LENGTH: usize = 78;

/// Packet id plus big-endian u32 version.
pub const BOOTSTRAP_INFO_HEADER_LENGTH: usize = 1 + 4;

pub const MAX_MOTD_LENGTH: usize = 256;

pub const MAX_UDP_PACKET_SIZE: usize = 2048;

/// Size of the random token carried in a get-nodes request.
pub const PING_ID_SIZE: usize = 8;

/// Fixed length of the TCP relay handshake request.
pub const TCP_HANDSHAKE_PACKET_LENGTH: usize = 128;

/// Fixed length of the TCP relay handshake response.
pub const TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH: usize = 96;
