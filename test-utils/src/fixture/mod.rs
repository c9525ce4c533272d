//! JSON fixtures for store files and webhook payloads.
//!
//! Fixtures are plain `serde_json::Value`s so they describe the on-disk and on-the-wire
//! shapes independently of the application's own types.

pub mod stripe;

use serde_json::{json, Map, Value};

/// An update-event object as written by the payment side.
pub fn update_event(
    guild_id: &str,
    tier: Option<&str>,
    expires: Option<i64>,
    processed: bool,
) -> Value {
    let mut event = Map::new();
    event.insert("guild_id".to_string(), json!(guild_id));
    event.insert("tier".to_string(), json!(tier));
    if let Some(expires) = expires {
        event.insert("expires".to_string(), json!(expires));
    }
    event.insert("processed".to_string(), json!(processed));

    Value::Object(event)
}

/// Canonical entitlement store contents from `(guild_id, tier, expires_at)` triples.
pub fn premium_mapping(records: &[(&str, &str, Option<i64>)]) -> Value {
    let guilds: Map<String, Value> = records
        .iter()
        .map(|(guild_id, tier, expires_at)| {
            let mut record = Map::new();
            record.insert("guild_id".to_string(), json!(guild_id));
            record.insert("tier".to_string(), json!(tier));
            if let Some(expires_at) = expires_at {
                record.insert("expires_at".to_string(), json!(expires_at));
            }
            record.insert("processed".to_string(), json!(true));
            (guild_id.to_string(), Value::Object(record))
        })
        .collect();

    json!({ "guilds": guilds })
}

/// Legacy premium list contents, `{"guild_ids": [...]}`.
pub fn legacy_premium_list(guild_ids: &[&str]) -> Value {
    json!({ "guild_ids": guild_ids })
}

/// Current unix time in seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
