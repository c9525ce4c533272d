//! Test factory for creating Serenity Guild objects.
//!
//! This module provides factory functions for creating mock Serenity `Guild` structs
//! for testing purposes. These factories create valid Guild objects by deserializing
//! JSON, simulating what Discord's API would return.

use serenity::all::{Guild, GuildChannel};

/// Creates a test Serenity Guild with customizable fields.
///
/// Creates a Guild object by deserializing JSON with the provided values. All other
/// fields are set to reasonable defaults; the guild has no roles and no cached members.
///
/// # Arguments
/// - `guild_id` - Discord guild ID (snowflake)
/// - `name` - Guild name
/// - `system_channel_id` - Optional system channel (should be one of `channels`)
/// - `channels` - Channels in the guild, e.g. from `create_test_channel`
///
/// # Returns
/// - `Guild` - A valid Serenity Guild struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a Guild (indicates invalid test data)
///
/// # Examples
///
/// ```rust,ignore
/// use test_utils::serenity::{create_test_channel, create_test_guild};
///
/// let general = create_test_channel(10, 123456789, "general", 0, 0);
/// let guild = create_test_guild(123456789, "Test Guild", Some(10), vec![general]);
/// ```
pub fn create_test_guild(
    guild_id: u64,
    name: &str,
    system_channel_id: Option<u64>,
    channels: Vec<GuildChannel>,
) -> Guild {
    let channels: Vec<serde_json::Value> = channels
        .iter()
        .map(|channel| {
            serde_json::to_value(channel).expect("Failed to encode test channel as JSON")
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "id": guild_id.to_string(),
        "name": name,
        "icon": null,
        "owner_id": "100000000000000000",
        "afk_timeout": 300,
        "system_channel_id": system_channel_id.map(|id| id.to_string()),
        "verification_level": 0,
        "default_message_notifications": 0,
        "explicit_content_filter": 0,
        "roles": [],
        "emojis": [],
        "stickers": [],
        "features": [],
        "mfa_level": 0,
        "system_channel_flags": 0,
        "premium_tier": 0,
        "premium_subscription_count": 0,
        "premium_progress_bar_enabled": false,
        "preferred_locale": "en-US",
        "nsfw_level": 0,
        "joined_at": "2020-01-01T00:00:00.000000+00:00",
        "large": false,
        "member_count": 100,
        "voice_states": [],
        "channels": channels,
        "threads": [],
        "presences": [],
        "max_presences": 25000,
        "max_members": 100000,
        "unavailable": false,
        "members": [],
        "stage_instances": [],
        "guild_scheduled_events": [],
    }))
    .expect("Failed to create test guild - invalid JSON structure")
}
