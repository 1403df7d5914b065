use std::sync::Arc;

use log::debug;
use tokio::sync::{mpsc, Mutex};

use common::{DeviceAddr, DiscoveryError, LinkAddr, PeerLinkConfig, RecvError, SendError};

/// One frame on the peer link, tagged with the remote's link address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFrame {
    pub peer: LinkAddr,
    pub payload: Vec<u8>,
}

/// Point-to-point peer-link transport. The radio itself belongs to an
/// external driver which pushes received frames into the inbound
/// channel and drains the outbound one; this handle only adapts that
/// push delivery to the pull interface the collector expects. Dropping
/// either channel end models the link going down.
#[derive(Clone)]
pub struct PeerLinkTransport {
    outbound: mpsc::Sender<PeerFrame>,
    inbound: Arc<Mutex<mpsc::Receiver<PeerFrame>>>,
}

impl PeerLinkTransport {
    pub fn new(
        config: &PeerLinkConfig,
        outbound: mpsc::Sender<PeerFrame>,
        inbound: mpsc::Receiver<PeerFrame>,
    ) -> Result<Self, DiscoveryError> {
        if config.pmk.is_empty() {
            return Err(DiscoveryError::Config(
                "peer link key must not be empty".to_string(),
            ));
        }
        debug!("peer link configured ({} byte key)", config.pmk.len());
        Ok(Self {
            outbound,
            inbound: Arc::new(Mutex::new(inbound)),
        })
    }

    pub async fn send_to(&self, target: &DeviceAddr, frame: &[u8]) -> Result<(), SendError> {
        let peer = match target {
            DeviceAddr::Broadcast => LinkAddr::BROADCAST,
            DeviceAddr::Link(addr) => *addr,
            DeviceAddr::Ip(addr) => {
                return Err(SendError::Unreachable(addr.to_string()));
            }
        };
        self.outbound
            .send(PeerFrame {
                peer,
                payload: frame.to_vec(),
            })
            .await
            .map_err(|_| SendError::SocketClosed)
    }

    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, DeviceAddr), RecvError> {
        let mut inbound = self.inbound.lock().await;
        match inbound.recv().await {
            Some(frame) => {
                let len = frame.payload.len().min(buf.len());
                buf[..len].copy_from_slice(&frame.payload[..len]);
                Ok((len, DeviceAddr::Link(frame.peer)))
            }
            None => Err(RecvError::SocketClosed),
        }
    }
}
