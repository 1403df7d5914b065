use log::{error, info};

use common::{Codec, DeviceAddr, SendError};

use crate::transport::Transport;

/// Local outcome of one request send.
#[derive(Debug, Clone)]
pub struct SendReport {
    pub target: DeviceAddr,
    pub result: Result<(), SendError>,
}

impl SendReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Emits one discovery request per target and reports the local send
/// outcome. Fire-and-forget: matching the asynchronous responses is
/// the collector's job.
pub struct Initiator {
    transport: Transport,
    codec: Codec,
}

impl Initiator {
    pub fn new(transport: Transport, codec: Codec) -> Self {
        Self { transport, codec }
    }

    /// A failed send for one target never aborts the remaining ones.
    pub async fn run(&self, targets: &[DeviceAddr]) -> Vec<SendReport> {
        let frame = self.codec.encode_request();
        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            let result = self.transport.send_to(target, &frame).await;
            match &result {
                Ok(()) => info!("discovery request sent to {}", target),
                Err(err) => {
                    error!("failed to send discovery request to {}: {}", target, err)
                }
            }
            reports.push(SendReport {
                target: target.clone(),
                result,
            });
        }
        reports
    }
}
