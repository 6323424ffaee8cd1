// https://crates.io/crates/adb_client
use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device, TcpTarget};
use adb_client::{ADBDeviceExt, ADBServer, DeviceShort, DeviceState};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

const SERVER_TIMEOUT: Duration = Duration::from_secs(15);

/// ADB backend that talks to the local ADB server directly over its socket
/// protocol, without spawning the `adb` executable.
#[derive(Debug, Clone, Default)]
pub struct RustAdb;

impl RustAdb {
    pub fn new() -> Self {
        Self
    }

    /// Run a blocking server request on the blocking pool, bounded by a timeout.
    async fn with_server<T, F>(description: String, request: F) -> AdbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut ADBServer) -> AdbResult<T> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(move || {
            let mut server = ADBServer::default();
            request(&mut server)
        });
        match tokio::time::timeout(SERVER_TIMEOUT, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(AdbError::Timeout {
                duration: SERVER_TIMEOUT,
                description,
            }),
        }
    }

    /// Only `device` entries can run commands; offline, unauthorized and
    /// connecting entries are dropped like the shell backend does.
    pub(crate) fn from_device_short(device: DeviceShort) -> Option<Device> {
        matches!(device.state, DeviceState::Device).then(|| Device {
            name: device.identifier,
            transport_id: None,
        })
    }

    /// The server protocol only accepts IPv4 socket addresses.
    fn socket_addr(target: &TcpTarget) -> AdbResult<SocketAddrV4> {
        let ip = target
            .host
            .parse::<Ipv4Addr>()
            .map_err(|e| AdbError::InvalidTarget {
                target: target.to_string(),
                reason: format!("{e}; the rust backend needs an IPv4 address"),
            })?;
        Ok(SocketAddrV4::new(ip, target.port))
    }
}

impl AdbClient for RustAdb {
    async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let devices = Self::with_server("list devices".to_string(), |server| {
            Ok(server.devices()?)
        })
        .await?;
        Ok(devices
            .into_iter()
            .filter_map(Self::from_device_short)
            .collect())
    }

    async fn connect(&self, target: &TcpTarget) -> AdbResult<String> {
        let address = Self::socket_addr(target)?;
        Self::with_server(format!("connect {target}"), move |server| {
            Ok(server.connect_device(address)?)
        })
        .await?;
        Ok(format!("connected to {target}"))
    }

    async fn pair(&self, target: &TcpTarget, code: &str) -> AdbResult<String> {
        let address = Self::socket_addr(target)?;
        let code = code.to_string();
        let label = target.to_string();
        Self::with_server(format!("pair {target}"), move |server| {
            server
                .pair(address, code)
                .map_err(|e| AdbError::PairRejected {
                    target: label,
                    output: e.to_string(),
                })
        })
        .await?;
        Ok(format!("Successfully paired to {target}"))
    }

    async fn shell(&self, serial: &str, command: &[&str]) -> AdbResult<Vec<u8>> {
        let serial = serial.to_string();
        let parts: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        Self::with_server(format!("shell {}", parts.join(" ")), move |server| {
            let mut device = server.get_device_by_name(&serial)?;
            let refs: Vec<&str> = parts.iter().map(|s| s.as_str()).collect();
            let mut out: Vec<u8> = Vec::new();
            device
                .shell_command(&refs, &mut out)
                .map_err(|source| AdbError::ShellCommandFailed {
                    command: parts.join(" "),
                    source,
                })?;
            Ok(out)
        })
        .await
    }
}
