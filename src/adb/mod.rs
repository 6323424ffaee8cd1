// ADB module - the device-communication capability used by the battery monitor.
// Two interchangeable backends: the external `adb` executable (shell) and the
// `adb_client` crate talking to the local ADB server (rust).

pub mod backend;
pub mod error;
pub mod rust_impl;
pub mod shell;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export the main types for easy access
pub use backend::{AdbBackend, BackendKind};
pub use error::{AdbError, AdbResult};
pub use rust_impl::RustAdb;
pub use shell::ShellAdb;
pub use types::{AdbClient, Device, TcpTarget};
