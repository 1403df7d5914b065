use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Closed set of device identities carried in discovery responses.
/// The ordinal is what travels on the wire in the binary framing, so
/// the discriminant values are part of the protocol and must not be
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DeviceType {
    Hub = 0,
    Router = 1,
    Cam = 2,
    MotionSensor = 3,
    TempSensor = 4,
}

impl DeviceType {
    /// Substituted when a response names a type we do not know and the
    /// collector is configured to be lenient.
    pub const FALLBACK: DeviceType = DeviceType::Hub;

    pub const ALL: [DeviceType; 5] = [
        DeviceType::Hub,
        DeviceType::Router,
        DeviceType::Cam,
        DeviceType::MotionSensor,
        DeviceType::TempSensor,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            DeviceType::Hub => "HUB",
            DeviceType::Router => "ROUTER",
            DeviceType::Cam => "CAM",
            DeviceType::MotionSensor => "MOTION_SENSOR",
            DeviceType::TempSensor => "TEMP_SENSOR",
        }
    }

    /// Exact match against the wire name table.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        DeviceType::ALL.iter().copied().find(|t| t.wire_name() == name)
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        DeviceType::ALL.get(value as usize).copied()
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for DeviceType {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::from_wire_name(&s.to_ascii_uppercase())
            .ok_or_else(|| DiscoveryError::Config(format!("unknown device type {:?}", s)))
    }
}

/// Six-byte link-layer identifier used by the peer-link transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkAddr(pub [u8; 6]);

impl LinkAddr {
    /// All-ones address the peer link treats as "every reachable peer".
    pub const BROADCAST: LinkAddr = LinkAddr([0xff; 6]);

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for LinkAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for LinkAddr {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for slot in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| DiscoveryError::Config(format!("bad link address {:?}", s)))?;
            *slot = u8::from_str_radix(part, 16)
                .map_err(|_| DiscoveryError::Config(format!("bad link address {:?}", s)))?;
        }
        if parts.next().is_some() {
            return Err(DiscoveryError::Config(format!("bad link address {:?}", s)));
        }
        Ok(LinkAddr(bytes))
    }
}

/// Opaque device address. Equality is byte/string-wise; this is the
/// registry key for both transports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceAddr {
    /// Pseudo-address meaning "all reachable peers".
    Broadcast,
    Ip(SocketAddr),
    Link(LinkAddr),
}

impl DeviceAddr {
    pub fn is_broadcast(&self) -> bool {
        matches!(self, DeviceAddr::Broadcast)
    }
}

impl fmt::Display for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceAddr::Broadcast => f.write_str("broadcast"),
            DeviceAddr::Ip(addr) => write!(f, "{}", addr),
            DeviceAddr::Link(addr) => write!(f, "{}", addr),
        }
    }
}

/// One discovered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responder {
    pub address: DeviceAddr,
    pub device_type: DeviceType,
    pub discovered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_ordinals_are_stable() {
        assert_eq!(DeviceType::Hub.ordinal(), 0);
        assert_eq!(DeviceType::TempSensor.ordinal(), 4);
        for ty in DeviceType::ALL {
            assert_eq!(DeviceType::from_ordinal(ty.ordinal()), Some(ty));
        }
        assert_eq!(DeviceType::from_ordinal(5), None);
    }

    #[test]
    fn device_type_name_lookup_is_exact() {
        assert_eq!(DeviceType::from_wire_name("CAM"), Some(DeviceType::Cam));
        assert_eq!(DeviceType::from_wire_name("cam"), None);
        assert_eq!(DeviceType::from_wire_name("FOO"), None);
    }

    #[test]
    fn device_type_from_str_is_lenient_about_case() {
        assert_eq!(
            "motion_sensor".parse::<DeviceType>().unwrap(),
            DeviceType::MotionSensor
        );
        assert!("doorbell".parse::<DeviceType>().is_err());
    }

    #[test]
    fn link_addr_round_trips_through_display() {
        let addr: LinkAddr = "24:6f:28:aa:bb:cc".parse().unwrap();
        assert_eq!(addr.to_string().parse::<LinkAddr>().unwrap(), addr);
        assert!("24:6f:28:aa:bb".parse::<LinkAddr>().is_err());
        assert!("24:6f:28:aa:bb:cc:dd".parse::<LinkAddr>().is_err());
        assert!("zz:6f:28:aa:bb:cc".parse::<LinkAddr>().is_err());
    }

    #[test]
    fn responder_serializes_to_json() {
        let responder = Responder {
            address: DeviceAddr::Ip("192.168.1.20:12345".parse().unwrap()),
            device_type: DeviceType::Cam,
            discovered_at: Utc::now(),
        };
        let json = serde_json::to_string(&responder).unwrap();
        let back: Responder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, responder);
    }
}
