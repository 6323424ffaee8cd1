use super::error::AdbResult;
use super::rust_impl::RustAdb;
use super::shell::ShellAdb;
use super::types::{AdbClient, Device, TcpTarget};
use std::path::Path;

/// Runtime choice between the `adb` executable and the pure Rust client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Shell,
    Rust,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Shell => "shell",
            BackendKind::Rust => "rust",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "shell" => Ok(BackendKind::Shell),
            "rust" => Ok(BackendKind::Rust),
            other => Err(format!("unknown impl '{other}', expected 'shell' or 'rust'")),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AdbBackend {
    Shell(ShellAdb),
    Rust(RustAdb),
}

impl AdbBackend {
    /// The rust backend ignores `binary`; it talks to an already running server.
    pub fn new(kind: BackendKind, binary: Option<&Path>) -> Self {
        match kind {
            BackendKind::Shell => AdbBackend::Shell(ShellAdb::new(binary)),
            BackendKind::Rust => AdbBackend::Rust(RustAdb::new()),
        }
    }
}

impl AdbClient for AdbBackend {
    async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        match self {
            AdbBackend::Shell(s) => s.list_devices().await,
            AdbBackend::Rust(r) => r.list_devices().await,
        }
    }

    async fn connect(&self, target: &TcpTarget) -> AdbResult<String> {
        match self {
            AdbBackend::Shell(s) => s.connect(target).await,
            AdbBackend::Rust(r) => r.connect(target).await,
        }
    }

    async fn pair(&self, target: &TcpTarget, code: &str) -> AdbResult<String> {
        match self {
            AdbBackend::Shell(s) => s.pair(target, code).await,
            AdbBackend::Rust(r) => r.pair(target, code).await,
        }
    }

    async fn shell(&self, serial: &str, command: &[&str]) -> AdbResult<Vec<u8>> {
        match self {
            AdbBackend::Shell(s) => s.shell(serial, command).await,
            AdbBackend::Rust(r) => r.shell(serial, command).await,
        }
    }
}
