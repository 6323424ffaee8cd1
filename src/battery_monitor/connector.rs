use super::types::{ConnectOutcome, TransportConfig, TransportMode};
use crate::adb::AdbClient;
use log::{info, warn};
use std::time::Duration;

/// Resolves a `TransportConfig` into a live connection.
///
/// Never fails: a TCP/wireless problem downgrades this cycle to USB-style
/// tracking and is reported as `ConnectOutcome::FellBackToUsb`. No retries
/// happen here, discovery takes over from the result.
pub struct DeviceConnector<'a, C> {
    client: &'a C,
    timeout: Duration,
}

impl<'a, C: AdbClient> DeviceConnector<'a, C> {
    pub fn new(client: &'a C, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn connect(&self, config: &TransportConfig) -> ConnectOutcome {
        if config.mode == TransportMode::Usb {
            info!("🔌 USB mode, waiting for the device to attach");
            return ConnectOutcome::Usb;
        }

        let Some(target) = config.tcp_target() else {
            let reason = format!("missing {:?} host/port", config.mode);
            warn!("⚠️ {reason}, falling back to USB");
            return ConnectOutcome::FellBackToUsb { reason };
        };

        info!("🌐 Connecting to {target} ({:?})", config.mode);
        match tokio::time::timeout(self.timeout, self.client.connect(&target)).await {
            Ok(Ok(output)) => {
                info!("✅ {}", output.trim());
                ConnectOutcome::Connected { target }
            }
            Ok(Err(e)) => {
                warn!("⚠️ Failed to connect to {target}, falling back to USB: {e}");
                ConnectOutcome::FellBackToUsb {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                let reason = format!("connect to {target} timed out after {:?}", self.timeout);
                warn!("⚠️ {reason}, falling back to USB");
                ConnectOutcome::FellBackToUsb { reason }
            }
        }
    }
}
