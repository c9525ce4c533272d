//! Guild availability handler.
//!
//! The `guild_create` event fires when a guild becomes available to the bot:
//! - On bot startup for each guild the bot is already in
//! - When the bot joins a new guild
//! - When a guild becomes available after a Discord outage
//!
//! Serenity caches the guild before this handler runs. From then on the reconciler can
//! resolve the guild, so pending premium updates for it are applied by the next sweep.

use serenity::all::{Context, Guild};

use crate::server::data::entitlement::EntitlementStore;

/// Handles guild availability.
///
/// # Arguments
/// - `store` - Entitlement store, used to log the guild's premium state
/// - `guild` - Guild that became available
/// - `is_new` - `Some(true)` if the bot just joined the guild
pub async fn handle_guild_create(
    store: &EntitlementStore,
    _ctx: Context,
    guild: Guild,
    is_new: Option<bool>,
) {
    let guild_id = guild.id.get().to_string();
    let premium = store.is_premium(&guild_id, chrono::Utc::now().timestamp()).await;

    if is_new == Some(true) {
        tracing::info!(
            "Joined guild {} ({}) - premium: {}",
            guild.name,
            guild_id,
            premium
        );
    } else {
        tracing::debug!(
            "Guild available: {} ({}) - premium: {}",
            guild.name,
            guild_id,
            premium
        );
    }
}
