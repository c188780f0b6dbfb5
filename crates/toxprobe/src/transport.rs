//! UDP and TCP channels with connect and read deadlines.
//!
//! The read deadline is fixed when the channel is opened: every read on the
//! channel must finish before it, however many reads there are.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket, lookup_host};
use tokio::time::{Instant, timeout, timeout_at};

use crate::error::PhaseError;

/// Connect and read budgets applied to every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self { connect: Duration::from_secs(2), read: Duration::from_secs(4) }
    }
}

/// Opens channels towards nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transport {
    deadlines: Deadlines,
}

impl Transport {
    pub fn new(deadlines: Deadlines) -> Self {
        Self { deadlines }
    }

    /// Open a connected UDP socket to `host:port`.
    pub async fn open_datagram(&self, host: &str, port: u16) -> Result<DatagramChannel, PhaseError> {
        let label = format!("udp://{host}:{port}");
        let socket = timeout(self.deadlines.connect, async {
            let addr = resolve(host, port, &label).await?;
            let local = if addr.is_ipv4() {
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
            } else {
                SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0)
            };
            let socket = UdpSocket::bind(local).await.map_err(|e| io_error(&label, e))?;
            socket.connect(addr).await.map_err(|e| io_error(&label, e))?;
            Ok::<_, PhaseError>(socket)
        })
        .await
        .map_err(|_| PhaseError::ConnectTimeout { addr: label.clone() })??;

        Ok(DatagramChannel { socket, read_deadline: Instant::now() + self.deadlines.read, label })
    }

    /// Open a TCP connection to `host:port`.
    pub async fn open_stream(&self, host: &str, port: u16) -> Result<StreamChannel, PhaseError> {
        let label = format!("tcp://{host}:{port}");
        let stream = timeout(self.deadlines.connect, async {
            let addr = resolve(host, port, &label).await?;
            TcpStream::connect(addr).await.map_err(|e| io_error(&label, e))
        })
        .await
        .map_err(|_| PhaseError::ConnectTimeout { addr: label.clone() })??;

        Ok(StreamChannel { stream, read_deadline: Instant::now() + self.deadlines.read, label })
    }
}

async fn resolve(host: &str, port: u16, label: &str) -> Result<SocketAddr, PhaseError> {
    let mut addrs = lookup_host((host, port)).await.map_err(|e| io_error(label, e))?;
    addrs.next().ok_or_else(|| {
        io_error(label, std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved"))
    })
}

fn io_error(label: &str, source: std::io::Error) -> PhaseError {
    PhaseError::Io { addr: label.to_string(), source }
}

/// Connected UDP socket. Dropping it closes the socket.
#[derive(Debug)]
pub struct DatagramChannel {
    socket: UdpSocket,
    read_deadline: Instant,
    label: String,
}

impl DatagramChannel {
    pub async fn send(&self, payload: &[u8]) -> Result<(), PhaseError> {
        self.socket.send(payload).await.map_err(|e| io_error(&self.label, e))?;
        Ok(())
    }

    /// Receive one datagram into `buffer`; longer datagrams are truncated.
    pub async fn recv(&self, buffer: &mut [u8]) -> Result<usize, PhaseError> {
        timeout_at(self.read_deadline, self.socket.recv(buffer))
            .await
            .map_err(|_| PhaseError::ReadTimeout { addr: self.label.clone() })?
            .map_err(|e| io_error(&self.label, e))
    }
}

/// TCP connection. Dropping it closes the connection.
#[derive(Debug)]
pub struct StreamChannel {
    stream: TcpStream,
    read_deadline: Instant,
    label: String,
}

impl StreamChannel {
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), PhaseError> {
        self.stream.write_all(payload).await.map_err(|e| io_error(&self.label, e))
    }

    /// Read until `buffer` is full or the peer closes the connection.
    /// Returns the number of bytes read.
    pub async fn read_full(&mut self, buffer: &mut [u8]) -> Result<usize, PhaseError> {
        let mut filled = 0;
        while filled < buffer.len() {
            let read = timeout_at(self.read_deadline, self.stream.read(&mut buffer[filled..]))
                .await
                .map_err(|_| PhaseError::ReadTimeout { addr: self.label.clone() })?
                .map_err(|e| io_error(&self.label, e))?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        Ok(filled)
    }
}
