use super::types::{PairingRequest, PairingResult};
use crate::adb::AdbClient;
use log::{error, info};
use thiserror::Error;

/// Failure of a pairing session, naming the step that failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("Invalid pairing request: {0}")]
    InvalidRequest(String),
    #[error("Pairing with {target} failed: {diagnostic}")]
    Pair { target: String, diagnostic: String },
    #[error("Connecting to {target} after pairing failed: {diagnostic}")]
    Connect { target: String, diagnostic: String },
}

/// One-shot pair-then-connect workflow.
///
/// Holds no supervisor state; the caller decides whether a successful
/// target becomes the new wireless setting.
pub struct PairingSession<C> {
    client: C,
}

impl<C: AdbClient> PairingSession<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn pair(&self, request: &PairingRequest) -> Result<String, PairError> {
        if request.host.trim().is_empty() {
            return Err(PairError::InvalidRequest("host is empty".to_string()));
        }
        if request.port == 0 {
            return Err(PairError::InvalidRequest("port must be non-zero".to_string()));
        }
        if request.code.trim().is_empty() {
            return Err(PairError::InvalidRequest("pairing code is empty".to_string()));
        }

        let target = request.target();
        let paired = self
            .client
            .pair(&target, request.code.trim())
            .await
            .map_err(|e| {
                error!("❌ Pairing with {target} failed: {e}");
                PairError::Pair {
                    target: target.to_string(),
                    diagnostic: e.diagnostic(),
                }
            })?;
        info!("🤝 Paired with {target}: {}", paired.trim());

        let connected = self.client.connect(&target).await.map_err(|e| {
            error!("❌ Connection to {target} failed after pairing: {e}");
            PairError::Connect {
                target: target.to_string(),
                diagnostic: e.diagnostic(),
            }
        })?;
        info!("✅ Connected to {target}: {}", connected.trim());

        Ok(format!(
            "Paired and connected: {}\n{}",
            paired.trim(),
            connected.trim()
        ))
    }
}

impl From<Result<String, PairError>> for PairingResult {
    fn from(result: Result<String, PairError>) -> Self {
        match result {
            Ok(message) => PairingResult {
                success: true,
                message,
            },
            Err(e) => PairingResult {
                success: false,
                message: e.to_string(),
            },
        }
    }
}
