//! Premium entitlement domain models.
//!
//! This module defines the records held by the entitlement store and the update events
//! consumed by the reconciler. Guild identifiers are kept as opaque strings: they come from
//! external payment metadata and are only parsed into Discord snowflakes at the gateway
//! boundary.

use serde::{Deserialize, Deserializer, Serialize};

/// Premium tier granted to a guild.
///
/// Deserialization is lenient: any unrecognized tier name maps to `Tier::None`, which
/// carries the generic feature list. A stored record with an odd tier name therefore never
/// makes the whole store unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Tier {
    #[default]
    None,
    Basic,
    Standard,
    Professional,
}

impl Tier {
    /// Parses a tier name case-insensitively, mapping unknown names to `Tier::None`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "basic" => Tier::Basic,
            "standard" => Tier::Standard,
            "professional" => Tier::Professional,
            _ => Tier::None,
        }
    }

    /// Lowercase identifier used on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Basic => "basic",
            Tier::Standard => "standard",
            Tier::Professional => "professional",
        }
    }

    /// Features unlocked by this tier, as listed in the activation notification.
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Tier::Basic => &[
                "Custom command prefix",
                "Extended moderation logs",
                "Priority support",
            ],
            Tier::Standard => &[
                "Everything in Basic",
                "Auto-moderation filters",
                "Custom welcome messages",
                "Reaction roles",
            ],
            Tier::Professional => &[
                "Everything in Standard",
                "Advanced raid protection",
                "Custom bot branding",
                "Dedicated support channel",
            ],
            Tier::None => &["All premium features unlocked"],
        }
    }
}

impl From<String> for Tier {
    fn from(value: String) -> Self {
        Tier::from_name(&value)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entitlement held by a guild in the store.
///
/// `processed` is monotonic: the reconciler only ever writes records with `processed = true`,
/// and nothing flips it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    pub guild_id: String,
    #[serde(default)]
    pub tier: Tier,
    /// Unix timestamp (seconds). Absent means non-expiring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub processed: bool,
}

impl EntitlementRecord {
    /// Creates an applied record. A zero or negative expiry is normalized to "no expiry".
    pub fn new(guild_id: impl Into<String>, tier: Tier, expires_at: Option<i64>) -> Self {
        Self {
            guild_id: guild_id.into(),
            tier,
            expires_at: expires_at.filter(|ts| *ts > 0),
            processed: true,
        }
    }

    /// Returns whether the entitlement is still in force at `now` (unix seconds).
    pub fn is_active(&self, now: i64) -> bool {
        match self.expires_at {
            Some(ts) if ts > 0 => ts > now,
            _ => true,
        }
    }
}

/// Unprocessed unit of work read from the shared update file or produced by a webhook.
///
/// Fields unknown to this model are preserved in `extra` so that rewriting the update
/// file never drops data written by the payment side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    #[serde(deserialize_with = "guild_id_from_string_or_number")]
    pub guild_id: String,
    /// Tier name; `None` means "remove premium".
    #[serde(default)]
    pub tier: Option<String>,
    /// Unix timestamp (seconds) at which the entitlement lapses.
    #[serde(default, rename = "expires", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub processed: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UpdateEvent {
    /// Event granting `tier` to a guild.
    pub fn grant(guild_id: impl Into<String>, tier: &str, expires_at: Option<i64>) -> Self {
        Self {
            guild_id: guild_id.into(),
            tier: Some(tier.to_string()),
            expires_at,
            processed: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Event removing premium from a guild.
    pub fn revoke(guild_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            tier: None,
            expires_at: None,
            processed: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Expiry if one was supplied and is positive.
    pub fn effective_expiry(&self) -> Option<i64> {
        self.expires_at.filter(|ts| *ts > 0)
    }

    /// Tier name this event grants, trimmed.
    ///
    /// `None` means the event removes premium: the tier is absent, blank, or literally
    /// `"none"`.
    pub fn granted_tier(&self) -> Option<&str> {
        self.tier
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case(Tier::None.as_str()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GuildIdRepr {
    Text(String),
    Number(u64),
}

/// Accepts guild ids written either as JSON strings or as bare numbers.
fn guild_id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match GuildIdRepr::deserialize(deserializer)? {
        GuildIdRepr::Text(id) => id,
        GuildIdRepr::Number(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests tier name parsing.
    ///
    /// Expected: known names parse case-insensitively, unknown names map to None
    #[test]
    fn test_tier_from_name() {
        assert_eq!(Tier::from_name("Standard"), Tier::Standard);
        assert_eq!(Tier::from_name(" professional "), Tier::Professional);
        assert_eq!(Tier::from_name("basic"), Tier::Basic);
        assert_eq!(Tier::from_name("gold"), Tier::None);
    }

    /// Tests that an unknown tier name in a stored record does not fail decoding.
    ///
    /// Expected: Ok with Tier::None
    #[test]
    fn test_record_with_unknown_tier_decodes() {
        let record: EntitlementRecord =
            serde_json::from_str(r#"{"guild_id":"1","tier":"platinum","processed":true}"#)
                .unwrap();
        assert_eq!(record.tier, Tier::None);
    }

    /// Tests record expiry evaluation.
    ///
    /// Expected: non-expiring records are always active, dated ones until their expiry
    #[test]
    fn test_record_is_active() {
        let forever = EntitlementRecord::new("1", Tier::Basic, None);
        assert!(forever.is_active(i64::MAX));

        let zero = EntitlementRecord::new("1", Tier::Basic, Some(0));
        assert_eq!(zero.expires_at, None);

        let dated = EntitlementRecord::new("1", Tier::Basic, Some(1_000));
        assert!(dated.is_active(999));
        assert!(!dated.is_active(1_000));
    }

    /// Tests decoding update events with numeric guild ids and extra fields.
    ///
    /// Expected: guild id converted to a string, unknown fields kept on re-encode
    #[test]
    fn test_update_event_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "guild_id": 42,
            "tier": "standard",
            "expires": 1_700_000_000,
            "processed": false,
            "customer": "cus_123"
        });

        let event: UpdateEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(event.guild_id, "42");
        assert_eq!(event.tier.as_deref(), Some("standard"));
        assert_eq!(event.effective_expiry(), Some(1_700_000_000));

        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded["customer"], "cus_123");
        assert_eq!(encoded["expires"], 1_700_000_000);
    }

    /// Tests which tier names grant premium.
    ///
    /// Expected: real and unknown names grant, blank and "none" remove
    #[test]
    fn test_update_event_granted_tier() {
        assert_eq!(
            UpdateEvent::grant("1", " Standard ", None).granted_tier(),
            Some("Standard")
        );
        assert_eq!(
            UpdateEvent::grant("1", "lifetime", None).granted_tier(),
            Some("lifetime")
        );
        assert_eq!(UpdateEvent::grant("1", "None", None).granted_tier(), None);
        assert_eq!(UpdateEvent::grant("1", "  ", None).granted_tier(), None);
        assert_eq!(UpdateEvent::revoke("1").granted_tier(), None);
    }

    /// Tests that a null tier decodes as a removal event.
    ///
    /// Expected: tier is None and processed defaults to false
    #[test]
    fn test_update_event_null_tier() {
        let event: UpdateEvent = serde_json::from_str(r#"{"guild_id":"42","tier":null}"#).unwrap();
        assert!(event.tier.is_none());
        assert!(!event.processed);
    }
}
