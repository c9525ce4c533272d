//! Signed payment and update webhook payloads.

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Stripe event envelope around `object`.
pub fn event(kind: &str, object: Value) -> Value {
    json!({
        "id": "evt_test_0001",
        "object": "event",
        "type": kind,
        "data": { "object": object }
    })
}

/// `checkout.session.completed` for `guild_id` buying `tier`.
pub fn checkout_completed(guild_id: &str, tier: &str) -> Value {
    event(
        "checkout.session.completed",
        json!({
            "id": "cs_test_0001",
            "client_reference_id": guild_id,
            "metadata": { "tier": tier }
        }),
    )
}

/// `customer.subscription.deleted` for `guild_id`.
pub fn subscription_deleted(guild_id: &str) -> Value {
    event(
        "customer.subscription.deleted",
        json!({
            "id": "sub_test_0001",
            "status": "canceled",
            "metadata": { "guild_id": guild_id }
        }),
    )
}

fn hex_hmac(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// `Stripe-Signature` header value for `payload` signed at `timestamp`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);
    format!("t={},v1={}", timestamp, hex_hmac(secret, &signed))
}

/// `X-Signature-256` header value for an update webhook `payload`.
pub fn update_signature_header(secret: &str, payload: &[u8]) -> String {
    format!("sha256={}", hex_hmac(secret, payload))
}
