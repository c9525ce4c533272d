//! Webhook signature verification.
//!
//! Two schemes are accepted:
//!
//! - **Payment provider** (`Stripe-Signature: t=<unix>,v1=<hex>`): HMAC-SHA256 over
//!   `"<t>.<raw body>"`, with the timestamp bounded to a tolerance window to reject replays.
//!   Several `v1` entries may be present during secret rotation; any match is accepted.
//! - **Update webhook** (`X-Signature-256: sha256=<hex>`): HMAC-SHA256 over the raw body.
//!
//! All digest comparisons are constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::server::error::webhook::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payment provider signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";
/// Header carrying the update webhook signature.
pub const UPDATE_SIGNATURE_HEADER: &str = "x-signature-256";
/// Maximum age (and clock skew) of a signed payment event, in seconds.
pub const STRIPE_TOLERANCE_SECS: i64 = 300;

const UPDATE_SIGNATURE_PREFIX: &str = "sha256=";

/// Verifies a payment provider signature header against the raw request body.
///
/// # Arguments
/// - `secret`: Endpoint signing secret
/// - `header`: Value of the `Stripe-Signature` header
/// - `payload`: Raw request body, exactly as received
/// - `now`: Current unix time in seconds
///
/// # Returns
/// - `Ok(())` - A `v1` signature matches and the timestamp is within tolerance
/// - `Err(WebhookError::InvalidSignatureFormat)` - Header lacks a timestamp or `v1` entry
/// - `Err(WebhookError::TimestampOutOfTolerance)` - Timestamp too old or too far ahead
/// - `Err(WebhookError::InvalidSignature)` - No `v1` entry matches
pub fn verify_stripe_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    WebhookError::InvalidSignatureFormat(format!("bad timestamp '{}'", value))
                })?);
            }
            Some(("v1", value)) => signatures.push(value),
            // Other schemes (e.g. v0 test signatures) are ignored.
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| WebhookError::InvalidSignatureFormat("missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(WebhookError::InvalidSignatureFormat(
            "missing v1 signature".to_string(),
        ));
    }

    if (now - timestamp).abs() > STRIPE_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance { timestamp });
    }

    let expected = compute_hmac(
        secret,
        &[timestamp.to_string().as_bytes(), b".", payload],
    )?;

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|provided| bool::from(provided.ct_eq(&expected)))
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature)
    }
}

/// Verifies an update webhook signature over the raw request body.
///
/// The `sha256=` prefix is optional.
pub fn verify_update_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
) -> Result<(), WebhookError> {
    let header = header.trim();
    let hex_digest = header.strip_prefix(UPDATE_SIGNATURE_PREFIX).unwrap_or(header);

    let provided = hex::decode(hex_digest)
        .map_err(|e| WebhookError::InvalidSignatureFormat(format!("signature is not hex: {}", e)))?;
    let expected = compute_hmac(secret, &[payload])?;

    if bool::from(provided.ct_eq(&expected)) {
        Ok(())
    } else {
        Err(WebhookError::InvalidSignature)
    }
}

fn compute_hmac(secret: &str, parts: &[&[u8]]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookError::Internal(format!("HMAC key rejected: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}
