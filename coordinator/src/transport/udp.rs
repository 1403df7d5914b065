use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, info};
use tokio::net::UdpSocket;

use common::{DeviceAddr, DiscoveryConfig, DiscoveryError, RecvError, SendError};

/// Broadcast/unicast UDP transport. Bind failure is fatal for the
/// caller; send and receive failures after that are reported as
/// discriminated results.
#[derive(Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    broadcast_target: SocketAddr,
}

impl UdpTransport {
    /// Bind the discovery socket on all interfaces at the configured
    /// port, broadcast enabled.
    pub async fn bind(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let broadcast_target = format!("{}:{}", config.broadcast_addr, config.port).parse()?;
        Self::bind_to(&format!("0.0.0.0:{}", config.port), broadcast_target).await
    }

    /// Bind to an explicit local address. Tests use this with an
    /// ephemeral port.
    pub async fn bind_to(
        bind_addr: &str,
        broadcast_target: SocketAddr,
    ) -> Result<Self, DiscoveryError> {
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;
        socket
            .set_broadcast(true)
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;

        info!(
            "udp transport bound to {}",
            socket
                .local_addr()
                .map_err(|e| DiscoveryError::Network(e.to_string()))?
        );

        Ok(Self {
            socket: Arc::new(socket),
            broadcast_target,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DiscoveryError> {
        self.socket.local_addr().map_err(Into::into)
    }

    pub async fn send_to(&self, target: &DeviceAddr, frame: &[u8]) -> Result<(), SendError> {
        let dest = match target {
            DeviceAddr::Broadcast => self.broadcast_target,
            DeviceAddr::Ip(addr) => *addr,
            DeviceAddr::Link(addr) => {
                return Err(SendError::Unreachable(addr.to_string()));
            }
        };
        match self.socket.send_to(frame, dest).await {
            Ok(sent) => {
                debug!("sent {} bytes to {}", sent, dest);
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Err(SendError::SocketClosed),
            Err(_) => Err(SendError::Unreachable(dest.to_string())),
        }
    }

    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, DeviceAddr), RecvError> {
        match self.socket.recv_from(buf).await {
            Ok((len, source)) => Ok((len, DeviceAddr::Ip(source))),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Err(RecvError::Interrupted),
            Err(_) => Err(RecvError::SocketClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_with_an_ephemeral_port() {
        let transport = UdpTransport::bind_to("127.0.0.1:0", "127.0.0.1:12345".parse().unwrap())
            .await
            .unwrap();
        assert_ne!(transport.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn link_targets_are_unreachable_over_udp() {
        let transport = UdpTransport::bind_to("127.0.0.1:0", "127.0.0.1:12345".parse().unwrap())
            .await
            .unwrap();
        let target = DeviceAddr::Link("24:6f:28:00:00:01".parse().unwrap());
        assert!(matches!(
            transport.send_to(&target, b"DISCOVER").await,
            Err(SendError::Unreachable(_))
        ));
    }
}
