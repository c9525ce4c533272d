//! Payment provider (Stripe) webhook events.
//!
//! The raw event is decoded into a `StripeEnvelope`, then dispatched on its `type` string into
//! the closed `PaymentEvent` enum. Types this bot does not act on land in
//! `PaymentEvent::Unhandled` and are acknowledged without side effects.

use serde::Deserialize;
use serde_json::Value;

use crate::server::{error::webhook::WebhookError, model::entitlement::UpdateEvent};

/// Subscription statuses that keep premium active.
const ACTIVE_SUBSCRIPTION_STATUSES: [&str; 2] = ["active", "trialing"];

/// Outer shape of every Stripe webhook event.
#[derive(Debug, Deserialize)]
pub struct StripeEnvelope {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: Value,
}

/// Payment events the reconciler understands.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    CheckoutCompleted(Value),
    SubscriptionCreated(Value),
    SubscriptionUpdated(Value),
    SubscriptionDeleted(Value),
    /// Any other event type, carried for logging.
    Unhandled(String),
}

impl PaymentEvent {
    pub fn from_envelope(envelope: StripeEnvelope) -> Self {
        let object = envelope.data.object;
        match envelope.kind.as_str() {
            "checkout.session.completed" => Self::CheckoutCompleted(object),
            "customer.subscription.created" => Self::SubscriptionCreated(object),
            "customer.subscription.updated" => Self::SubscriptionUpdated(object),
            "customer.subscription.deleted" => Self::SubscriptionDeleted(object),
            _ => Self::Unhandled(envelope.kind),
        }
    }

    /// Converts the event into the update it implies for the entitlement store.
    ///
    /// # Returns
    /// - `Ok(Some(UpdateEvent))` - Event grants or removes premium for a guild
    /// - `Ok(None)` - Event type is not handled
    /// - `Err(WebhookError::InvalidPayload)` - Guild id or tier missing from the event
    pub fn into_update_event(self) -> Result<Option<UpdateEvent>, WebhookError> {
        match self {
            Self::CheckoutCompleted(object) => {
                let guild_id = object
                    .get("client_reference_id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .or_else(|| metadata_str(&object, "guild_id"))
                    .ok_or_else(|| missing("guild_id"))?;
                let tier = metadata_str(&object, "tier").ok_or_else(|| missing("tier"))?;
                let expires_at = metadata_i64(&object, "expires_at");

                Ok(Some(UpdateEvent::grant(guild_id, &tier, expires_at)))
            }
            Self::SubscriptionCreated(object) | Self::SubscriptionUpdated(object) => {
                let guild_id = metadata_str(&object, "guild_id").ok_or_else(|| missing("guild_id"))?;
                let status = object.get("status").and_then(Value::as_str).unwrap_or("active");

                if !ACTIVE_SUBSCRIPTION_STATUSES.contains(&status) {
                    return Ok(Some(UpdateEvent::revoke(guild_id)));
                }

                let tier = metadata_str(&object, "tier").ok_or_else(|| missing("tier"))?;
                let expires_at = object.get("current_period_end").and_then(Value::as_i64);

                Ok(Some(UpdateEvent::grant(guild_id, &tier, expires_at)))
            }
            Self::SubscriptionDeleted(object) => {
                let guild_id = metadata_str(&object, "guild_id").ok_or_else(|| missing("guild_id"))?;
                Ok(Some(UpdateEvent::revoke(guild_id)))
            }
            Self::Unhandled(_) => Ok(None),
        }
    }
}

fn missing(field: &str) -> WebhookError {
    WebhookError::InvalidPayload(format!("event is missing {}", field))
}

fn metadata_str(object: &Value, key: &str) -> Option<String> {
    match object.get("metadata")?.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Stripe metadata values are strings; numbers are accepted too.
fn metadata_i64(object: &Value, key: &str) -> Option<i64> {
    match object.get("metadata")?.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(kind: &str, object: Value) -> StripeEnvelope {
        serde_json::from_value(json!({
            "id": "evt_test",
            "type": kind,
            "data": { "object": object }
        }))
        .unwrap()
    }

    /// Tests checkout completion mapping with a client reference id.
    ///
    /// Expected: grant event for the referenced guild with metadata tier and expiry
    #[test]
    fn checkout_completed_grants_tier() {
        let event = PaymentEvent::from_envelope(envelope(
            "checkout.session.completed",
            json!({
                "client_reference_id": "42",
                "metadata": { "tier": "professional", "expires_at": "1800000000" }
            }),
        ));

        let update = event.into_update_event().unwrap().unwrap();
        assert_eq!(update.guild_id, "42");
        assert_eq!(update.tier.as_deref(), Some("professional"));
        assert_eq!(update.expires_at, Some(1_800_000_000));
        assert!(!update.processed);
    }

    /// Tests subscription update with a lapsed status.
    ///
    /// Expected: removal event
    #[test]
    fn past_due_subscription_revokes() {
        let event = PaymentEvent::from_envelope(envelope(
            "customer.subscription.updated",
            json!({
                "status": "past_due",
                "metadata": { "guild_id": "42", "tier": "basic" }
            }),
        ));

        let update = event.into_update_event().unwrap().unwrap();
        assert_eq!(update.tier, None);
    }

    /// Tests subscription creation using the billing period end as expiry.
    ///
    /// Expected: grant event with current_period_end
    #[test]
    fn subscription_created_uses_period_end() {
        let event = PaymentEvent::from_envelope(envelope(
            "customer.subscription.created",
            json!({
                "status": "active",
                "current_period_end": 1_750_000_000,
                "metadata": { "guild_id": "7", "tier": "standard" }
            }),
        ));

        let update = event.into_update_event().unwrap().unwrap();
        assert_eq!(update.guild_id, "7");
        assert_eq!(update.expires_at, Some(1_750_000_000));
    }

    /// Tests subscription deletion.
    ///
    /// Expected: removal event
    #[test]
    fn subscription_deleted_revokes() {
        let event = PaymentEvent::from_envelope(envelope(
            "customer.subscription.deleted",
            json!({ "metadata": { "guild_id": "42" } }),
        ));
        assert_eq!(
            event.into_update_event().unwrap(),
            Some(UpdateEvent::revoke("42"))
        );
    }

    /// Tests that unknown event types are not acted upon.
    ///
    /// Expected: Unhandled variant and no update event
    #[test]
    fn unknown_type_is_unhandled() {
        let event = PaymentEvent::from_envelope(envelope("invoice.paid", json!({})));
        assert_eq!(event, PaymentEvent::Unhandled("invoice.paid".to_string()));
        assert_eq!(event.into_update_event().unwrap(), None);
    }

    /// Tests an event without any guild reference.
    ///
    /// Expected: Err(InvalidPayload)
    #[test]
    fn missing_guild_is_invalid() {
        let event = PaymentEvent::from_envelope(envelope(
            "checkout.session.completed",
            json!({ "metadata": { "tier": "basic" } }),
        ));
        assert!(matches!(
            event.into_update_event(),
            Err(WebhookError::InvalidPayload(_))
        ));
    }
}
