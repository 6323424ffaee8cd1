// Core ADB types and traits
use super::error::AdbResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Capabilities the monitor needs from an ADB implementation (shell or rust).
///
/// Futures are `Send` so a generic supervisor can live on a spawned task.
pub trait AdbClient: Send + Sync {
    /// Attached devices in the order the server reports them.
    fn list_devices(&self) -> impl Future<Output = AdbResult<Vec<Device>>> + Send;

    /// `adb connect host:port`; returns the tool output on success.
    fn connect(&self, target: &TcpTarget) -> impl Future<Output = AdbResult<String>> + Send;

    /// `adb pair host:port code`; returns the tool output on success.
    fn pair(&self, target: &TcpTarget, code: &str)
    -> impl Future<Output = AdbResult<String>> + Send;

    /// Run a shell command on `serial` and return its raw stdout.
    fn shell(&self, serial: &str, command: &[&str])
    -> impl Future<Output = AdbResult<Vec<u8>>> + Send;
}

#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Device {
    pub name: String,
    pub transport_id: Option<String>,
}

/// A `host:port` network endpoint for TCP or wireless debugging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TcpTarget {
    pub host: String,
    pub port: u16,
}

impl TcpTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host:port`, splitting on the last colon.
    pub fn parse(value: &str) -> Option<Self> {
        let (host, port) = value.trim().rsplit_once(':')?;
        let port = port.parse::<u16>().ok().filter(|p| *p != 0)?;
        if host.is_empty() {
            return None;
        }
        Some(Self::new(host, port))
    }
}

impl fmt::Display for TcpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
