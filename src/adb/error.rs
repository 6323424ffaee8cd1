use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("ADB executable not found at {path:?}. Install Android Platform Tools or pass --adb=<path>.")]
    BinaryNotFound { path: PathBuf },

    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Connection to {target} was rejected: {output}")]
    ConnectRejected { target: String, output: String },

    #[error("Pairing with {target} was rejected: {output}")]
    PairRejected { target: String, output: String },

    #[error("Invalid TCP target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("ADB server request failed: {source}")]
    Server {
        #[from]
        source: adb_client::RustADBError,
    },

    #[error("Shell command '{command}' failed: {source}")]
    ShellCommandFailed {
        command: String,
        source: adb_client::RustADBError,
    },

    #[error("Operation timed out after {duration:?}: {description}")]
    Timeout {
        duration: std::time::Duration,
        description: String,
    },

    #[error("Task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl AdbError {
    /// The text the underlying tool reported, without our own framing.
    pub fn diagnostic(&self) -> String {
        match self {
            AdbError::CommandFailed { stderr, .. } => stderr.clone(),
            AdbError::ConnectRejected { output, .. } | AdbError::PairRejected { output, .. } => {
                output.clone()
            }
            AdbError::Server { source } | AdbError::ShellCommandFailed { source, .. } => {
                source.to_string()
            }
            other => other.to_string(),
        }
    }

    /// True when retrying cannot help until the configuration changes.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AdbError::BinaryNotFound { .. } | AdbError::InvalidTarget { .. }
        )
    }
}
