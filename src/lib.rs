pub mod adb;
pub mod args;
pub mod battery_monitor;

pub use adb::{AdbBackend, BackendKind};
pub use battery_monitor::{ConnectionSupervisor, MonitorHandle, PairingSession};
