// Types and enums for the battery monitor
use crate::adb::TcpTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5555;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Usb,
    Tcp,
    Wireless,
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "usb" => Ok(TransportMode::Usb),
            "tcp" => Ok(TransportMode::Tcp),
            "wireless" => Ok(TransportMode::Wireless),
            other => Err(format!(
                "unknown mode '{other}', expected 'usb', 'tcp' or 'wireless'"
            )),
        }
    }
}

/// Resolved connection settings. Replaced wholesale on every settings change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub mode: TransportMode,
    pub host: String,
    pub port: u16,
    /// Custom adb executable; `None` selects the bundled default.
    pub binary_path: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::Usb,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            binary_path: None,
        }
    }
}

impl TransportConfig {
    pub fn usb() -> Self {
        Self::default()
    }

    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            mode: TransportMode::Tcp,
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn wireless(host: impl Into<String>, port: u16) -> Self {
        Self {
            mode: TransportMode::Wireless,
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_binary_path(mut self, path: Option<PathBuf>) -> Self {
        self.binary_path = path;
        self
    }

    /// Canonical form used for change detection: trimmed host, and an empty
    /// binary path means "use the default". A blank host stays blank so
    /// wireless mode without a paired target still falls back to USB.
    pub fn normalized(mut self) -> Self {
        self.host = self.host.trim().to_string();
        if self
            .binary_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.binary_path = None;
        }
        self
    }

    /// Network endpoint for TCP and wireless modes. `None` in USB mode or
    /// when host/port are missing, which the connector treats as USB.
    pub fn tcp_target(&self) -> Option<TcpTarget> {
        match self.mode {
            TransportMode::Usb => None,
            TransportMode::Tcp | TransportMode::Wireless => {
                let host = self.host.trim();
                if host.is_empty() || self.port == 0 {
                    None
                } else {
                    Some(TcpTarget::new(host, self.port))
                }
            }
        }
    }
}

/// Serial or `host:port` of the tracked device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryReading {
    /// Percentage, 0..=100.
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ConnectionPhase {
    #[default]
    Idle,
    Connecting,
    Discovering,
    Tracking,
    BackingOff,
}

/// How the connector resolved the transport for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConnectOutcome {
    /// USB mode: the device attaches itself to the bridge daemon.
    Usb,
    /// Explicit network connect succeeded.
    Connected { target: TcpTarget },
    /// TCP/wireless was requested but could not be used; tracking continues
    /// as if in USB mode.
    FellBackToUsb { reason: String },
}

impl ConnectOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConnectOutcome::FellBackToUsb { .. })
    }
}

/// Supervisor-owned view of the connection. Published read-only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    pub device: Option<DeviceId>,
    /// Consecutive discoveries without a device since the last success.
    pub discovery_attempts: u32,
    /// Incremented every time the cycle (re)starts from Connecting.
    pub cycle: u64,
    pub transport: Option<ConnectOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MonitorEvent {
    /// `None` means no device is present.
    Battery(Option<BatteryReading>),
    StateChanged(ConnectionState),
    TransportResolved(ConnectOutcome),
    DeviceLost { device: DeviceId, reason: String },
}

#[derive(Debug, Clone)]
pub enum SupervisorCommand {
    ApplySettings(TransportConfig),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTiming {
    pub poll_interval: Duration,
    pub discovery_backoff: Duration,
    pub poll_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for MonitorTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            discovery_backoff: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRequest {
    pub host: String,
    pub port: u16,
    pub code: String,
}

impl PairingRequest {
    pub fn new(host: impl Into<String>, port: u16, code: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            code: code.into(),
        }
    }

    pub fn target(&self) -> TcpTarget {
        TcpTarget::new(self.host.trim(), self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairingResult {
    pub success: bool,
    pub message: String,
}
