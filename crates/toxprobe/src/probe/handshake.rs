//! Phase C: TCP relay handshake on every candidate port, concurrently.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::crypto::{CryptoProvider, PUBLIC_KEY_SIZE};
use crate::error::PhaseError;
use crate::protocol::{TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH, handshake_request};
use crate::transport::Transport;

/// Outcome of one port attempt.
#[derive(Debug)]
pub struct HandshakeResult {
    pub port: u16,
    pub outcome: Result<(), PhaseError>,
}

/// Try a handshake on one port. The connection is closed when this returns.
pub async fn try_port(
    transport: &Transport,
    crypto: &dyn CryptoProvider,
    host: &str,
    port: u16,
    node_public_key: &[u8; PUBLIC_KEY_SIZE],
) -> Result<(), PhaseError> {
    let mut channel = transport.open_stream(host, port).await?;
    channel.send(&handshake_request(crypto, node_public_key)?).await?;

    let mut buffer = [0u8; TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH];
    let read = channel.read_full(&mut buffer).await?;
    if read != TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH {
        return Err(PhaseError::HandshakeLength {
            got: read,
            expected: TCP_HANDSHAKE_RESPONSE_PACKET_LENGTH,
        });
    }
    Ok(())
}

/// Probe all `ports` at once and wait for every attempt to finish.
///
/// Returns the ports whose handshake succeeded, in the order given.
pub async fn probe_ports(
    transport: Transport,
    crypto: Arc<dyn CryptoProvider>,
    host: &str,
    ports: &[u16],
    node_public_key: [u8; PUBLIC_KEY_SIZE],
    limit: Option<Arc<Semaphore>>,
) -> Vec<u16> {
    let tasks = ports.iter().map(|&port| {
        let crypto = crypto.clone();
        let host = host.to_string();
        let limit = limit.clone();
        tokio::spawn(async move {
            let _permit = match limit {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            let outcome = try_port(&transport, crypto.as_ref(), &host, port, &node_public_key).await;
            HandshakeResult { port, outcome }
        })
    });

    let mut open = Vec::new();
    for joined in join_all(tasks).await {
        match joined {
            Ok(HandshakeResult { port, outcome: Ok(()) }) => open.push(port),
            Ok(HandshakeResult { port, outcome: Err(e) }) => {
                debug!("TCP handshake with {}:{} failed: {}", host, port, e);
            }
            Err(e) => error!("TCP handshake task for {} panicked: {}", host, e),
        }
    }
    open
}
