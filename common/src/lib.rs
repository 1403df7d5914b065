use std::time::Duration;

pub mod codec;
pub mod config;
pub mod error;
pub mod types;

pub use codec::{Codec, DiscoveryRequest, DiscoveryResponse, Message, WireFormat};
pub use error::{DiscoveryError, ParseError, RecvError, Result, SendError};
pub use types::*;

/// Knobs for one discovery session.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub port: u16,
    pub broadcast_addr: String,
    pub max_responders: usize,
    pub wire_format: WireFormat,
    /// How long the collector keeps listening after the send pass.
    /// `None` runs until explicitly stopped.
    pub listen_window: Option<Duration>,
    pub max_datagram_size: usize,
    pub fallback: FallbackPolicy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: 12345,
            broadcast_addr: "255.255.255.255".to_string(),
            max_responders: 10,
            wire_format: WireFormat::Text,
            listen_window: None,
            max_datagram_size: codec::MAX_DATAGRAM,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// What the collector does with a response whose device type does not
/// resolve against the known table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Record the responder under the given substitute type.
    Substitute(DeviceType),
    /// Discard the response.
    Reject,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Substitute(DeviceType::FALLBACK)
    }
}

/// Peer-link credentials. The key is handed to the link driver as-is;
/// nothing in this workspace interprets it.
#[derive(Debug, Clone)]
pub struct PeerLinkConfig {
    pub pmk: String,
}

impl Default for PeerLinkConfig {
    fn default() -> Self {
        Self {
            pmk: "pmk12345678901234567890".to_string(),
        }
    }
}
