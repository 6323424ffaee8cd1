use super::error::{AdbError, AdbResult};
use super::types::{AdbClient, Device, TcpTarget};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(20);

#[cfg(windows)]
const ADB_EXECUTABLE: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_EXECUTABLE: &str = "adb";

/// ADB backend that drives the external `adb` executable.
#[derive(Debug, Clone)]
pub struct ShellAdb {
    binary: PathBuf,
}

impl ShellAdb {
    /// Build a client for `configured`, falling back to a bundled or
    /// well-known `adb` when the configured path does not exist.
    pub fn new(configured: Option<&Path>) -> Self {
        let binary = resolve_adb_binary(configured);
        debug!("Using adb executable {}", binary.display());
        Self { binary }
    }

    async fn run(&self, args: &[&str]) -> AdbResult<std::process::Output> {
        let command = format!("adb {}", args.join(" "));
        debug!("{command}");
        let output = tokio::time::timeout(
            COMMAND_TIMEOUT,
            Command::new(&self.binary).args(args).kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| AdbError::Timeout {
            duration: COMMAND_TIMEOUT,
            description: command.clone(),
        })?;
        output.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdbError::BinaryNotFound {
                    path: self.binary.clone(),
                }
            } else {
                AdbError::Spawn { command, source: e }
            }
        })
    }

    /// Run and require a zero exit status.
    async fn run_checked(&self, args: &[&str]) -> AdbResult<std::process::Output> {
        let output = self.run(args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(AdbError::CommandFailed {
                command: format!("adb {}", args.join(" ")),
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(output)
    }

    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .skip(1)
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 && parts[1] == "device" {
                    let name = parts[0].to_string();
                    let transport_id = parts
                        .iter()
                        .find_map(|part| part.strip_prefix("transport_id:"))
                        .map(str::to_string);
                    Some(Device { name, transport_id })
                } else {
                    None
                }
            })
            .collect()
    }

    /// `adb connect` exits 0 even when it could not reach the target.
    pub fn connect_failed(output: &str) -> bool {
        let lower = output.to_ascii_lowercase();
        ["failed to connect", "cannot connect", "unable to connect", "connection refused"]
            .iter()
            .any(|needle| lower.contains(needle))
    }

    pub fn pair_failed(output: &str) -> bool {
        let trimmed = output.trim_start();
        trimmed.starts_with("Failed") || trimmed.starts_with("error:")
    }
}

impl AdbClient for ShellAdb {
    async fn list_devices(&self) -> AdbResult<Vec<Device>> {
        let output = self.run_checked(&["devices", "-l"]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(Self::parse_devices(&stdout))
    }

    async fn connect(&self, target: &TcpTarget) -> AdbResult<String> {
        let address = target.to_string();
        let output = self.run_checked(&["connect", &address]).await?;
        let text = combined_output(&output);
        if Self::connect_failed(&text) {
            return Err(AdbError::ConnectRejected {
                target: address,
                output: text,
            });
        }
        Ok(text)
    }

    async fn pair(&self, target: &TcpTarget, code: &str) -> AdbResult<String> {
        let address = target.to_string();
        let output = self.run(&["pair", &address, code]).await?;
        let text = combined_output(&output);
        if !output.status.success() || Self::pair_failed(&text) {
            return Err(AdbError::PairRejected {
                target: address,
                output: text,
            });
        }
        Ok(text)
    }

    async fn shell(&self, serial: &str, command: &[&str]) -> AdbResult<Vec<u8>> {
        let mut args = vec!["-s", serial, "shell"];
        args.extend_from_slice(command);
        let output = self.run_checked(&args).await?;
        Ok(output.stdout)
    }
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    match (stdout.trim(), stderr.trim()) {
        (out, "") => out.to_string(),
        ("", err) => err.to_string(),
        (out, err) => format!("{out}\n{err}"),
    }
}

/// Pick the adb executable: configured path, bundled copy next to our own
/// executable, the Android SDK, then whatever `adb` is on PATH.
pub fn resolve_adb_binary(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        if path.is_file() {
            return path.to_path_buf();
        }
        warn!(
            "⚠️ Configured adb '{}' does not exist, falling back to default",
            path.display()
        );
    }

    let bundled = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(ADB_EXECUTABLE)));
    let android_home = std::env::var_os("ANDROID_HOME")
        .map(|home| PathBuf::from(home).join("platform-tools").join(ADB_EXECUTABLE));
    let user_sdk = homedir::my_home().ok().flatten().map(|home| {
        home.join("Android")
            .join("Sdk")
            .join("platform-tools")
            .join(ADB_EXECUTABLE)
    });

    [bundled, android_home, user_sdk]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(ADB_EXECUTABLE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_is_reported_as_binary_not_found() {
        let adb = ShellAdb {
            binary: PathBuf::from("/definitely/not/here/adb"),
        };
        let result = adb.list_devices().await;
        assert!(
            matches!(result, Err(AdbError::BinaryNotFound { .. })),
            "Expected BinaryNotFound, got {:?}",
            result
        );
    }
}
