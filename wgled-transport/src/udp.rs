//! UDP transport for controller boards
//!
//! Boards listen for 64-byte command datagrams (port 60000 by default) and
//! never reply to the remote-activate command. The default deployment targets
//! the broadcast address, so the socket is bound with `SO_BROADCAST` set.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{endpoint::Endpoint, error::*, Transport};

/// UDP transport for controller boards
///
/// Bind once, then share (`send` takes `&self`).
///
/// ```no_run
/// use wgled_transport::{Endpoint, Transport, UdpTransport};
///
/// # async fn demo() -> wgled_transport::Result<()> {
/// let mut transport = UdpTransport::new();
/// transport.bind().await?;
///
/// let frame = [0u8; 64];
/// transport.send(&Endpoint::new("192.168.0.10", 60000), &frame).await?;
/// # Ok(())
/// # }
/// ```
pub struct UdpTransport {
    bind_addr: String,
    broadcast: bool,
    socket: Option<UdpSocket>,
    send_timeout: Duration,
}

impl UdpTransport {
    /// Create new UDP transport (unbound)
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:0".to_string(),
            broadcast: true,
            socket: None,
            send_timeout: Duration::from_secs(1),
        }
    }

    /// Set local bind address
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Enable or disable broadcast sends
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Set send timeout
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Bind the local socket
    pub async fn bind(&mut self) -> Result<()> {
        if self.is_bound() {
            return Err(Error::AlreadyBound);
        }

        let socket = UdpSocket::bind(&self.bind_addr).await.map_err(Error::Io)?;
        socket.set_broadcast(self.broadcast)?;

        debug!("UDP socket bound on {}", socket.local_addr()?);

        self.socket = Some(socket);
        Ok(())
    }

    /// Check if bound
    pub fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    /// Local socket address, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, endpoint: &Endpoint, data: &[u8]) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(Error::NotBound)?;
        let remote = endpoint.resolve().await?;

        trace!(
            "Sending {} bytes via UDP to {}: {:02X?}",
            data.len(),
            remote,
            &data[..data.len().min(16)]
        );

        let sent = timeout(self.send_timeout, socket.send_to(data, remote))
            .await
            .map_err(|_| {
                warn!("Send to {} timed out", remote);
                Error::Io(std::io::ErrorKind::TimedOut.into())
            })?
            .map_err(|e| {
                warn!("Send to {} failed: {}", remote, e);
                Error::Io(e)
            })?;

        if sent != data.len() {
            return Err(Error::ShortWrite {
                sent,
                expected: data.len(),
            });
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.local_addr()
            .map(|addr| format!("udp://{}", addr))
            .unwrap_or_else(|| format!("udp://{} (unbound)", self.bind_addr))
    }
}
