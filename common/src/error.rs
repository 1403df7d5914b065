use std::net::AddrParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("network error: {0}")]
    Network(String),
    #[error("transport closed")]
    TransportClosed,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("registry full ({0} responders)")]
    CapacityExceeded(usize),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Frame-level decode failures. Always recoverable: the offending
/// datagram is discarded and the listener keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("frame of {0} bytes is shorter than the minimum for its kind")]
    TruncatedFrame(usize),
    #[error("unrecognized message kind")]
    UnknownKind,
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
    #[error("unknown device type {0:?}")]
    UnknownDeviceType(String),
}

/// Send-side transport outcomes, reported per target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("target {0} unreachable")]
    Unreachable(String),
    #[error("socket closed")]
    SocketClosed,
}

/// Receive-side transport outcomes. Both variants are fatal for the
/// task that owns the receive loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecvError {
    #[error("socket closed")]
    SocketClosed,
    #[error("receive interrupted")]
    Interrupted,
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::Serialization(err.to_string())
    }
}

impl From<AddrParseError> for DiscoveryError {
    fn from(err: AddrParseError) -> Self {
        DiscoveryError::Network(err.to_string())
    }
}

impl From<SendError> for DiscoveryError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::SocketClosed => DiscoveryError::TransportClosed,
            other => DiscoveryError::Network(other.to_string()),
        }
    }
}

impl From<RecvError> for DiscoveryError {
    fn from(err: RecvError) -> Self {
        match err {
            RecvError::SocketClosed => DiscoveryError::TransportClosed,
            RecvError::Interrupted => {
                DiscoveryError::Network("receive interrupted".to_string())
            }
        }
    }
}
