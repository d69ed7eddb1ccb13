//! Network endpoint of a board

use std::fmt;
use std::net::SocketAddr;

use crate::error::{Error, Result};

/// Host and port a frame is delivered to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve to a socket address (first result wins)
    pub async fn resolve(&self) -> Result<SocketAddr> {
        let addr_str = self.to_string();

        let mut addrs = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", addr_str, e)))?;

        addrs
            .next()
            .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", addr_str)))
    }
}

impl From<&wgled_core::BoardIdentity> for Endpoint {
    fn from(board: &wgled_core::BoardIdentity) -> Self {
        Self::new(board.address(), board.port())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
