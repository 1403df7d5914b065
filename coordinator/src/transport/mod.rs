//! Transport port for the discovery protocol.
//!
//! Two variants carry the same frames: a broadcast-capable UDP socket
//! and a point-to-point peer link fed by an external driver. Everything
//! above this module sees one send/receive surface addressed by
//! [`DeviceAddr`], so the initiator, collector, and registry are
//! written once.

mod peer;
mod udp;

pub use peer::{PeerFrame, PeerLinkTransport};
pub use udp::UdpTransport;

use common::{DeviceAddr, RecvError, SendError};

#[derive(Clone)]
pub enum Transport {
    Udp(UdpTransport),
    PeerLink(PeerLinkTransport),
}

impl Transport {
    /// Send one frame to a target. `DeviceAddr::Broadcast` resolves to
    /// the variant's broadcast address. Expected network failures come
    /// back as [`SendError`], never as a panic.
    pub async fn send_to(&self, target: &DeviceAddr, frame: &[u8]) -> Result<(), SendError> {
        match self {
            Transport::Udp(transport) => transport.send_to(target, frame).await,
            Transport::PeerLink(transport) => transport.send_to(target, frame).await,
        }
    }

    /// Receive one frame into `buf`, returning its length and source
    /// address. Blocks until a frame arrives or the transport closes.
    pub async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, DeviceAddr), RecvError> {
        match self {
            Transport::Udp(transport) => transport.recv_from(buf).await,
            Transport::PeerLink(transport) => transport.recv_from(buf).await,
        }
    }
}

impl From<UdpTransport> for Transport {
    fn from(transport: UdpTransport) -> Self {
        Transport::Udp(transport)
    }
}

impl From<PeerLinkTransport> for Transport {
    fn from(transport: PeerLinkTransport) -> Self {
        Transport::PeerLink(transport)
    }
}
