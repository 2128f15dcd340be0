//! Shared-secret request verification.

use sha2::{Digest, Sha256};

use tidewatch_core::error::{Result, TidewatchError};

/// Verify a command request body against its signature header.
///
/// The signature is the hex sha256 of `secret || body`. With no secret
/// configured, verification is disabled and every request passes.
pub fn verify_signature(secret: Option<&str>, signature: Option<&str>, body: &str) -> Result<()> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let Some(signature) = signature else {
        return Err(TidewatchError::AuthFailed("missing signature header".into()));
    };

    let mut hasher = Sha256::new();
    hasher.update(format!("{secret}{body}"));
    let expected = format!("{:x}", hasher.finalize());

    if expected != signature {
        return Err(TidewatchError::AuthFailed("invalid signature".into()));
    }
    Ok(())
}
