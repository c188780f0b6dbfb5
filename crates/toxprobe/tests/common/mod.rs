//! Loopback stand-ins for a bootstrap node.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use toxprobe::crypto::{BoxCryptoProvider, CryptoProvider, NONCE_SIZE};
use toxprobe::protocol::{
    BOOTSTRAP_INFO_PACKET_ID, GET_NODES_PACKET_ID, SEND_NODES_IPV6_PACKET_ID,
    TCP_HANDSHAKE_PACKET_LENGTH,
};
use toxprobe::transport::Deadlines;
use toxprobe::{NodeRecord, ProbeSettings};

/// How the UDP side of a mock node answers.
#[derive(Debug, Clone)]
pub struct UdpBehaviour {
    /// Raw reply to an info request, `None` to stay silent
    pub info_reply: Option<Vec<u8>>,
    pub answer_discovery: bool,
}

impl Default for UdpBehaviour {
    fn default() -> Self {
        Self { info_reply: Some(vec![240, 0, 0, 0, 7, b'h', b'i', 0, 0]), answer_discovery: true }
    }
}

/// A node with its own keypair listening on a loopback UDP port.
pub struct MockNode {
    pub crypto: Arc<BoxCryptoProvider>,
    pub udp_port: u16,
    /// Get-nodes requests that decrypted with the node's key
    pub discovery_requests: Arc<AtomicUsize>,
}

impl MockNode {
    pub fn public_key_hex(&self) -> String {
        hex::encode_upper(self.crypto.public_key())
    }

    pub fn record(&self) -> NodeRecord {
        NodeRecord::new("127.0.0.1", "-", self.udp_port, self.public_key_hex(), "tester", "DE")
    }

    pub fn directory_row(&self) -> String {
        format!("| 127.0.0.1 | NONE | {} | {} | tester | DE |", self.udp_port, self.public_key_hex())
    }

    pub fn discovery_requests(&self) -> usize {
        self.discovery_requests.load(Ordering::SeqCst)
    }
}

pub async fn spawn_udp_node(behaviour: UdpBehaviour) -> MockNode {
    let crypto = Arc::new(BoxCryptoProvider::generate().unwrap());
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let udp_port = socket.local_addr().unwrap().port();
    let discovery_requests = Arc::new(AtomicUsize::new(0));

    let node_crypto = crypto.clone();
    let counter = discovery_requests.clone();
    tokio::spawn(async move {
        let mut buffer = [0u8; 2048];
        loop {
            let Ok((len, from)) = socket.recv_from(&mut buffer).await else { break };
            let packet = &buffer[..len];
            match packet.first() {
                Some(&BOOTSTRAP_INFO_PACKET_ID) => {
                    if let Some(reply) = &behaviour.info_reply {
                        let _ = socket.send_to(reply, from).await;
                    }
                }
                Some(&GET_NODES_PACKET_ID) => {
                    if decrypts(&node_crypto, &packet[1..]) {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    if behaviour.answer_discovery {
                        let _ = socket.send_to(&[SEND_NODES_IPV6_PACKET_ID, 0], from).await;
                    }
                }
                _ => {}
            }
        }
    });

    MockNode { crypto, udp_port, discovery_requests }
}

/// `packet` = `[sender pk][nonce][tag || ciphertext]`
fn decrypts(node: &BoxCryptoProvider, packet: &[u8]) -> bool {
    if packet.len() < 32 + NONCE_SIZE {
        return false;
    }
    let mut sender = [0u8; 32];
    sender.copy_from_slice(&packet[..32]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&packet[32..32 + NONCE_SIZE]);

    let key = node.shared_key(&sender);
    node.decrypt(&key, &nonce, &packet[32 + NONCE_SIZE..]).is_ok()
}

/// TCP relay stand-in answering every valid handshake with `reply_len` bytes.
pub struct MockRelay {
    pub port: u16,
    /// Handshakes that decrypted with the node's key
    pub handshakes: Arc<AtomicUsize>,
}

pub async fn spawn_tcp_relay(node: &MockNode, reply_len: usize) -> MockRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handshakes = Arc::new(AtomicUsize::new(0));

    let crypto = node.crypto.clone();
    let counter = handshakes.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else { break };
            let crypto = crypto.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut request = [0u8; TCP_HANDSHAKE_PACKET_LENGTH];
                if stream.read_exact(&mut request).await.is_err() {
                    return;
                }
                if decrypts(&crypto, &request) {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                let _ = stream.write_all(&vec![0xAB; reply_len]).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    MockRelay { port, handshakes }
}

/// A TCP port that accepts connections and never answers.
pub async fn silent_tcp_listener() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    port
}

/// A loopback port with nothing listening on it.
pub async fn closed_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub const QUICK_READ: Duration = Duration::from_millis(300);

pub fn quick_settings(tcp_ports: Vec<u16>) -> ProbeSettings {
    ProbeSettings {
        deadlines: Deadlines {
            connect: Duration::from_millis(500),
            read: QUICK_READ,
        },
        tcp_ports,
        ..ProbeSettings::default()
    }
}
