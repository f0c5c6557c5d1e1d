use super::error::WorkflowError;
use crate::intent::Intent;
use crate::shared::{Network, RunId};
use sha2::{Digest, Sha256};

pub const CONFIRM_TOKEN_PREFIX: &str = "CONFIRM-";
const CONFIRM_TOKEN_HEX_LEN: usize = 10;

/// Deterministic in `(run_id, network, intent)`; any field change yields a new token.
pub fn derive_confirm_token(
    run_id: &RunId,
    network: Network,
    intent: &Intent,
) -> Result<String, WorkflowError> {
    let canonical_intent =
        serde_json::to_vec(intent).map_err(|err| WorkflowError::IntentEncoding(err.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(run_id.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(network.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(&canonical_intent);
    let digest = hasher.finalize();
    let hex = to_hex(&digest);
    Ok(format!(
        "{CONFIRM_TOKEN_PREFIX}{}",
        hex[..CONFIRM_TOKEN_HEX_LEN].to_ascii_uppercase()
    ))
}

/// Production execution gate. Must run before any collaborator call.
pub fn verify_execution_gate(
    network: Network,
    confirm_mainnet: bool,
    provided: Option<&str>,
    expected: &str,
) -> Result<(), WorkflowError> {
    if !network.is_production() {
        return Ok(());
    }
    if !confirm_mainnet {
        return Err(WorkflowError::ConfirmationRequired { network });
    }
    match provided {
        None => Err(WorkflowError::ConfirmTokenMissing {
            network,
            expected: expected.to_string(),
        }),
        Some(token) if token == expected => Ok(()),
        Some(token) => Err(WorkflowError::ConfirmTokenMismatch {
            expected: expected.to_string(),
            provided: token.to_string(),
        }),
    }
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
