//! Single-port TCP reachability probes

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::model::ProbeOutcome;

/// Tests whether one TCP port accepts connections
#[async_trait]
pub trait PortProber: Send + Sync {
    async fn probe(&self, addr: IpAddr, port: u16) -> ProbeOutcome;
}

/// Prober performing a plain TCP connect bounded by a timeout
///
/// No payload is exchanged. The stream, or the pending connect on timeout,
/// is dropped before returning, which closes the socket.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl PortProber for TcpProber {
    async fn probe(&self, addr: IpAddr, port: u16) -> ProbeOutcome {
        let target = SocketAddr::new(addr, port);

        match timeout(self.timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                debug!(%target, "port open");
                ProbeOutcome::Open
            }
            Ok(Err(e)) => {
                trace!(%target, error = %e, "connect failed");
                ProbeOutcome::NotOpen
            }
            Err(_elapsed) => {
                trace!(%target, timeout = ?self.timeout, "connect timed out");
                ProbeOutcome::NotOpen
            }
        }
    }
}
