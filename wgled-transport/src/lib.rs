//! Transport layer for controller boards
//!
//! Fire-and-forget datagram delivery: one send per frame, no acknowledgment,
//! no retry.

pub mod endpoint;
pub mod error;
pub mod udp;

pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use udp::UdpTransport;

use async_trait::async_trait;

/// Transport trait for different delivery methods
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one frame to `endpoint`
    async fn send(&self, endpoint: &Endpoint, data: &[u8]) -> Result<()>;

    /// Short description for logs (e.g. local socket address)
    fn describe(&self) -> String;
}
