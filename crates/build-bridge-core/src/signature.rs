//! HMAC-SHA256 webhook signature validation.
//!
//! Providers sign the raw request body with a shared secret and send the
//! hex-encoded digest in a signature header, optionally prefixed with
//! `sha256=`. Validation recomputes the digest over the exact bytes received
//! and compares in constant time.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SignatureValidator trait
// ============================================================================

/// Validates a webhook signature against the raw payload bytes.
///
/// Abstracted as a trait so the request pipeline can be exercised in tests
/// without real key material.
#[async_trait]
pub trait SignatureValidator: Send + Sync {
    /// Validate `signature` over `payload` using `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when the signature header is malformed or
    /// the digest does not match.
    async fn validate_signature(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<(), SignatureError>;
}

// ============================================================================
// HmacSha256Validator
// ============================================================================

/// The production validator: HMAC-SHA256 over the raw body.
#[derive(Debug, Clone, Default)]
pub struct HmacSha256Validator;

impl HmacSha256Validator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignatureValidator for HmacSha256Validator {
    async fn validate_signature(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<(), SignatureError> {
        let hex_digest = signature.strip_prefix("sha256=").unwrap_or(signature);

        let expected = hex::decode(hex_digest).map_err(|_| {
            warn!("signature header is not valid hex");
            SignatureError::MalformedSignature
        })?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| SignatureError::InvalidSecret)?;
        mac.update(payload);

        // verify_slice compares in constant time.
        mac.verify_slice(&expected)
            .map_err(|_| SignatureError::VerificationFailed)
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Signature validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// Validation is enabled but the request carried no signature header.
    #[error("signature header is missing")]
    MissingSignature,

    /// The signature header is not a hex-encoded digest.
    #[error("signature header is malformed")]
    MalformedSignature,

    /// The shared secret could not be used as HMAC key material.
    #[error("signing secret is unusable")]
    InvalidSecret,

    /// The recomputed digest does not match the header.
    #[error("signature verification failed")]
    VerificationFailed,
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
