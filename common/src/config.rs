use std::time::Duration;

use crate::codec::WireFormat;
use crate::{DiscoveryConfig, PeerLinkConfig};

impl DiscoveryConfig {
    /// Load from the environment, falling back to defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("DISCOVERY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            broadcast_addr: std::env::var("BROADCAST_ADDR")
                .unwrap_or(defaults.broadcast_addr),
            max_responders: std::env::var("MAX_RESPONDERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_responders),
            wire_format: std::env::var("WIRE_FORMAT")
                .ok()
                .and_then(|v| v.parse::<WireFormat>().ok())
                .unwrap_or(defaults.wire_format),
            listen_window: std::env::var("LISTEN_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .or(defaults.listen_window),
            max_datagram_size: defaults.max_datagram_size,
            fallback: defaults.fallback,
        }
    }
}

impl PeerLinkConfig {
    pub fn from_env() -> Self {
        Self {
            pmk: std::env::var("PEER_LINK_KEY")
                .unwrap_or_else(|_| PeerLinkConfig::default().pmk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_protocol_constants() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.port, 12345);
        assert_eq!(config.broadcast_addr, "255.255.255.255");
        assert_eq!(config.max_responders, 10);
        assert_eq!(config.wire_format, WireFormat::Text);
        assert_eq!(config.max_datagram_size, crate::codec::MAX_DATAGRAM);
    }
}
