use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Notify;
use tokio::time::Instant;

use common::{
    Codec, DeviceAddr, DeviceType, DiscoveryConfig, FallbackPolicy, Message, ParseError, Result,
};

use super::registry::{InsertOutcome, ResponderRegistry};
use crate::transport::Transport;

/// Per-session counters, observable while the collector runs.
#[derive(Debug, Default)]
pub struct CollectorStats {
    frames_received: AtomicU64,
    frames_discarded: AtomicU64,
    fallbacks_applied: AtomicU64,
}

impl CollectorStats {
    pub fn received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn discarded(&self) -> u64 {
        self.frames_discarded.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks_applied.load(Ordering::Relaxed)
    }
}

/// Long-running listener half of a discovery session.
///
/// Loops on the transport's receive side, parsing inbound frames and
/// recording responses into the registry. Malformed datagrams and full
/// registries are per-message events: logged, counted, and survived.
/// Only a closed transport ends the loop with an error; the stop
/// signal and the optional listen window end it cleanly.
pub struct Collector {
    transport: Transport,
    registry: Arc<ResponderRegistry>,
    codec: Codec,
    fallback: FallbackPolicy,
    max_datagram: usize,
    listen_window: Option<Duration>,
    stop: Arc<Notify>,
    stats: Arc<CollectorStats>,
}

impl Collector {
    pub fn new(
        config: &DiscoveryConfig,
        transport: Transport,
        registry: Arc<ResponderRegistry>,
        stop: Arc<Notify>,
        stats: Arc<CollectorStats>,
    ) -> Self {
        Self {
            transport,
            registry,
            codec: Codec::new(config.wire_format),
            fallback: config.fallback,
            max_datagram: config.max_datagram_size,
            listen_window: config.listen_window,
            stop,
            stats,
        }
    }

    pub async fn run(self) -> Result<()> {
        let deadline = self.listen_window.map(|window| Instant::now() + window);
        let mut buf = vec![0u8; self.max_datagram];
        info!("collector listening");

        loop {
            tokio::select! {
                _ = self.stop.notified() => {
                    info!("collector stopped");
                    return Ok(());
                }
                _ = wait_until(deadline) => {
                    info!("listen window elapsed");
                    return Ok(());
                }
                received = self.transport.recv_from(&mut buf) => match received {
                    Ok((len, source)) => self.handle_frame(&buf[..len], source),
                    Err(err) => {
                        warn!("collector terminating: {}", err);
                        return Err(err.into());
                    }
                }
            }
        }
    }

    fn handle_frame(&self, frame: &[u8], source: DeviceAddr) {
        self.stats.frames_received.fetch_add(1, Ordering::Relaxed);
        match self.codec.decode(frame) {
            Ok(Message::Response(response)) => self.record(source, response.device_type),
            Ok(Message::Request(_)) => {
                // Our own broadcast echoed back, or another coordinator
                // probing the segment.
                debug!("ignoring request frame from {}", source);
            }
            Err(ParseError::UnknownDeviceType(token)) => match self.fallback {
                FallbackPolicy::Substitute(substitute) => {
                    warn!(
                        "response from {} names unknown type {:?}, recording as {}",
                        source, token, substitute
                    );
                    self.stats.fallbacks_applied.fetch_add(1, Ordering::Relaxed);
                    self.record(source, substitute);
                }
                FallbackPolicy::Reject => {
                    warn!(
                        "rejecting response from {} with unknown type {:?}",
                        source, token
                    );
                    self.stats.frames_discarded.fetch_add(1, Ordering::Relaxed);
                }
            },
            Err(err) => {
                warn!("discarding frame from {}: {}", source, err);
                self.stats.frames_discarded.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record(&self, address: DeviceAddr, device_type: DeviceType) {
        match self.registry.insert(address.clone(), device_type) {
            Ok(InsertOutcome::Inserted(index)) => {
                info!(
                    "discovered {} device at {} (entry {})",
                    device_type, address, index
                );
            }
            Ok(InsertOutcome::Updated(_)) => {
                debug!("refreshed {} at {}", device_type, address);
            }
            Err(_) => {
                // Full registry is not an error for the session; the
                // registry counts the drop.
                debug!("registry full, dropping response from {}", address);
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
