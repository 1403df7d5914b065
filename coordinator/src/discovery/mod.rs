//! Discovery session: one initiator send pass paired with a collector
//! listening window, sharing a bounded responder registry.

mod collector;
mod initiator;
mod registry;

pub use collector::{Collector, CollectorStats};
pub use initiator::{Initiator, SendReport};
pub use registry::{InsertOutcome, ResponderRegistry};

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

use common::{Codec, DeviceAddr, DiscoveryConfig, DiscoveryError, Responder, Result};

use crate::transport::Transport;

/// Running discovery session. Results accumulate in the registry for
/// as long as the collector listens; there is no per-request matching,
/// so treat them as a set gathered over the window.
pub struct DiscoveryHandle {
    session_id: Uuid,
    registry: Arc<ResponderRegistry>,
    stats: Arc<CollectorStats>,
    stop: Arc<Notify>,
    collector: JoinHandle<Result<()>>,
    send_report: Vec<SendReport>,
}

impl DiscoveryHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn registry(&self) -> &Arc<ResponderRegistry> {
        &self.registry
    }

    /// Devices discovered so far, in arrival order.
    pub fn results(&self) -> Vec<Responder> {
        self.registry.snapshot()
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }

    pub fn dropped(&self) -> u64 {
        self.registry.dropped()
    }

    pub fn stats(&self) -> &CollectorStats {
        &self.stats
    }

    /// Per-target outcomes of the send pass.
    pub fn send_report(&self) -> &[SendReport] {
        &self.send_report
    }

    pub fn is_finished(&self) -> bool {
        self.collector.is_finished()
    }

    /// Signal the collector and wait for it to exit.
    pub async fn stop(self) -> Result<()> {
        self.stop.notify_one();
        self.collector
            .await
            .map_err(|e| DiscoveryError::Internal(e.to_string()))?
    }

    /// Wait for the collector to end on its own: listen window elapsed
    /// or transport closed.
    pub async fn join(self) -> Result<()> {
        self.collector
            .await
            .map_err(|e| DiscoveryError::Internal(e.to_string()))?
    }
}

/// Start one discovery round: spawn the collector, then emit one
/// request per target. Returns as soon as the send pass is done; the
/// collector keeps filling the registry in the background.
pub async fn start_discovery(
    config: DiscoveryConfig,
    transport: Transport,
    targets: Vec<DeviceAddr>,
) -> Result<DiscoveryHandle> {
    let session_id = Uuid::new_v4();
    let registry = Arc::new(ResponderRegistry::new(config.max_responders));
    let stats = Arc::new(CollectorStats::default());
    let stop = Arc::new(Notify::new());
    let codec = Codec::new(config.wire_format);

    info!(
        "discovery session {} starting ({} target(s))",
        session_id,
        targets.len()
    );

    // Collector first, so responses racing the send pass are not lost.
    let collector = Collector::new(
        &config,
        transport.clone(),
        Arc::clone(&registry),
        Arc::clone(&stop),
        Arc::clone(&stats),
    );
    let collector = tokio::spawn(collector.run());

    let initiator = Initiator::new(transport, codec);
    let send_report = initiator.run(&targets).await;
    if !send_report.is_empty() && send_report.iter().all(|r| r.result.is_err()) {
        warn!("session {}: no discovery request could be sent", session_id);
    }

    Ok(DiscoveryHandle {
        session_id,
        registry,
        stats,
        stop,
        collector,
        send_report,
    })
}
