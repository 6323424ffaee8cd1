use super::types::{BatteryReading, DeviceId, MonitorEvent};
use crate::adb::{AdbClient, AdbError};
use log::{debug, info, warn};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

pub const BATTERY_COMMAND: &[&str] = &["dumpsys", "battery"];

/// Why a single poll could not reach the device.
#[derive(Debug, Error)]
pub enum PollFailure {
    #[error("battery poll failed: {0}")]
    Transport(#[from] AdbError),
    #[error("battery poll timed out after {0:?}")]
    Timeout(Duration),
}

/// Polls one device for its battery level at a fixed cadence.
pub struct TelemetryPoller<'a, C> {
    client: &'a C,
    events: &'a broadcast::Sender<MonitorEvent>,
    interval: Duration,
    timeout: Duration,
}

impl<'a, C: AdbClient> TelemetryPoller<'a, C> {
    pub fn new(
        client: &'a C,
        events: &'a broadcast::Sender<MonitorEvent>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            events,
            interval,
            timeout,
        }
    }

    /// Poll until the device stops answering and return why.
    ///
    /// The first poll runs after `first_poll_delay` (zero polls right away).
    /// Each poll is awaited before the next tick, and ticks missed while a
    /// slow poll was running are skipped, so at most one poll is ever in
    /// flight. Dropping the future cancels the loop with no further emissions.
    pub async fn track(&self, device: &DeviceId, first_poll_delay: Duration) -> PollFailure {
        let mut ticker = tokio::time::interval_at(Instant::now() + first_poll_delay, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.poll_once(device).await {
                Ok(Some(reading)) => {
                    info!("🔋 {device}: {}%", reading.level);
                    let _ = self.events.send(MonitorEvent::Battery(Some(reading)));
                }
                Ok(None) => {
                    debug!("No battery level in dumpsys output from {device}, skipping tick");
                }
                Err(failure) => {
                    warn!("⚠️ {device}: {failure}");
                    return failure;
                }
            }
        }
    }

    /// One diagnostic round trip. `Ok(None)` when the output had no usable
    /// `level:` field.
    pub async fn poll_once(&self, device: &DeviceId) -> Result<Option<BatteryReading>, PollFailure> {
        let output = tokio::time::timeout(
            self.timeout,
            self.client.shell(device.as_str(), BATTERY_COMMAND),
        )
        .await
        .map_err(|_| PollFailure::Timeout(self.timeout))??;
        let text = String::from_utf8_lossy(&output);
        Ok(parse_battery_level(&text).map(|level| BatteryReading { level }))
    }
}

/// Extract the first `level: <digits>` value in 0..=100 from free-form
/// `dumpsys battery` text.
pub fn parse_battery_level(output: &str) -> Option<u8> {
    output.match_indices("level:").find_map(|(idx, key)| {
        let rest = output[idx + key.len()..].trim_start_matches([' ', '\t']);
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse::<u8>().ok().filter(|level| *level <= 100)
    })
}
