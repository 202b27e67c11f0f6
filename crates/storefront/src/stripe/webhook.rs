//! Webhook signature verification.
//!
//! Stripe signs each delivery with `Stripe-Signature: t=<unix>,v1=<hex>`
//! where `v1` is HMAC-SHA256 over `"{t}.{raw body}"` with the endpoint's
//! signing secret. Verification must run over the raw bytes before any JSON
//! parsing, and must bound the timestamp age to stop replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed payload.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Reasons a webhook signature is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is missing a timestamp")]
    MissingTimestamp,
    #[error("signature header is missing a v1 signature")]
    MissingSignature,
    #[error("signature timestamp is not a number")]
    InvalidTimestamp,
    #[error("signature timestamp outside tolerance")]
    Expired,
    #[error("signature does not match payload")]
    Mismatch,
}

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing why the delivery must be
/// rejected. Any error is a security rejection; the payload must not be
/// parsed.
pub fn verify(payload: &[u8], header: &str, secret: &str) -> Result<(), SignatureError> {
    verify_at(payload, header, secret, chrono::Utc::now().timestamp())
}

/// [`verify`] with an explicit clock, for tests.
pub fn verify_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            // Multiple v1 entries appear during secret rotation; accept any.
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Mismatch)?;
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    if signatures.iter().any(|s| *s == expected) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
