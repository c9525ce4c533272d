//! Application commands registered by the bot.

use chrono::DateTime;
use serenity::all::{CreateCommand, CreateEmbed};

use crate::server::model::{entitlement::EntitlementRecord, notification::ACTIVATED_COLOR};

pub const PREMIUM_COMMAND: &str = "premium";

const INACTIVE_COLOR: u32 = 0x95a5a6;

/// Every command the bot registers globally.
pub fn all() -> Vec<CreateCommand> {
    vec![CreateCommand::new(PREMIUM_COMMAND).description("Show this server's premium status")]
}

/// Reply to `/premium` for a guild with the given stored entitlement.
///
/// # Arguments
/// - `record`: The guild's entitlement, if any
/// - `now`: Current unix time, used to tell lapsed entitlements apart
pub fn premium_status_embed(record: Option<&EntitlementRecord>, now: i64) -> CreateEmbed {
    let embed = CreateEmbed::new().title("Premium Status");

    match record {
        Some(record) if record.is_active(now) => {
            let expiry = record
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.format("%B %d, %Y").to_string())
                .unwrap_or_else(|| "Never".to_string());

            embed
                .color(ACTIVATED_COLOR)
                .description("This server has premium.")
                .field("Tier", record.tier.to_string(), true)
                .field("Expires", expiry, true)
        }
        Some(_) => embed
            .color(INACTIVE_COLOR)
            .description("This server's premium subscription has expired."),
        None => embed
            .color(INACTIVE_COLOR)
            .description("This server does not have premium."),
    }
}
