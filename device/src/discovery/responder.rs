use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use tokio::net::UdpSocket;

use common::codec::MAX_DATAGRAM;
use common::{Codec, DeviceType, DiscoveryError, Message, Result, WireFormat};

/// Answers discovery requests with this device's identity.
///
/// Listens on the discovery port; every valid request gets one
/// response sent back to its source address. Anything else that lands
/// on the socket is logged and ignored.
pub struct ResponderService {
    socket: UdpSocket,
    device_type: DeviceType,
    codec: Codec,
    // Spread replies out so a broadcast request does not trigger a
    // synchronized burst from every device on the segment.
    reply_jitter_ms: u64,
}

impl ResponderService {
    pub async fn bind(
        bind_addr: &str,
        device_type: DeviceType,
        format: WireFormat,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;
        socket
            .set_broadcast(true)
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;

        info!(
            "responder bound to {}",
            socket
                .local_addr()
                .map_err(|e| DiscoveryError::Network(e.to_string()))?
        );

        Ok(Self {
            socket,
            device_type,
            codec: Codec::new(format),
            reply_jitter_ms: 25,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }

    /// Tests disable jitter for deterministic timing.
    pub fn without_jitter(mut self) -> Self {
        self.reply_jitter_ms = 0;
        self
    }

    pub async fn run(&self) -> Result<()> {
        info!("responder announcing as {}", self.device_type);
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let (len, source) = self
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(|e| DiscoveryError::Network(e.to_string()))?;

            match self.codec.decode(&buf[..len]) {
                Ok(Message::Request(_)) => {
                    if let Err(err) = self.reply(source).await {
                        warn!("failed to answer {}: {}", source, err);
                    }
                }
                Ok(Message::Response(_)) => {
                    debug!("ignoring response frame from {}", source);
                }
                Err(err) => {
                    debug!("ignoring undecodable frame from {}: {}", source, err);
                }
            }
        }
    }

    async fn reply(&self, source: SocketAddr) -> Result<()> {
        if self.reply_jitter_ms > 0 {
            let wait = rand::thread_rng().gen_range(0..=self.reply_jitter_ms);
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }

        let frame = self.codec.encode_response(self.device_type);
        self.socket
            .send_to(&frame, source)
            .await
            .map_err(|e| DiscoveryError::Network(e.to_string()))?;

        info!(
            "answered discovery request from {} as {}",
            source, self.device_type
        );
        Ok(())
    }
}
