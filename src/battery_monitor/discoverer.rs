use super::types::DeviceId;
use crate::adb::{AdbClient, AdbResult};
use log::{debug, info};

/// Picks the device to track: the first one the server lists.
///
/// Only one device is ever tracked, so there is no disambiguation. An empty
/// list is `Ok(None)`; retry timing belongs to the supervisor.
pub struct DeviceDiscoverer<'a, C> {
    client: &'a C,
}

impl<'a, C: AdbClient> DeviceDiscoverer<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn discover(&self) -> AdbResult<Option<DeviceId>> {
        let devices = self.client.list_devices().await?;
        debug!("🔍 {} device(s) attached", devices.len());
        Ok(devices.into_iter().next().map(|device| {
            info!("📱 Device found: {}", device.name);
            DeviceId::new(device.name)
        }))
    }
}
