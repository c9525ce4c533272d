//! Premium notification content and the guild view used to deliver it.
//!
//! The reconciler decides *what* to say and *where* to say it using these plain types; the
//! gateway implementation only turns a `PremiumNotification` into an embed and posts it.

use chrono::DateTime;

use super::entitlement::Tier;

/// Embed color for activation notices (green).
pub const ACTIVATED_COLOR: u32 = 0x2ecc71;
/// Embed color for expiry notices (red).
pub const EXPIRED_COLOR: u32 = 0xe74c3c;

/// User-facing message announcing a change in a guild's premium status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PremiumNotification {
    Activated {
        /// Tier name as received, used for display
        tier_name: String,
        tier: Tier,
        expires_at: Option<i64>,
    },
    Expired,
}

impl PremiumNotification {
    /// Builds an activation notice for `tier_name`.
    pub fn activated(tier_name: &str, expires_at: Option<i64>) -> Self {
        Self::Activated {
            tier_name: tier_name.trim().to_string(),
            tier: Tier::from_name(tier_name),
            expires_at: expires_at.filter(|ts| *ts > 0),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Activated { .. } => "Premium Activated",
            Self::Expired => "Premium Expired",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Self::Activated { .. } => ACTIVATED_COLOR,
            Self::Expired => EXPIRED_COLOR,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Activated { tier_name, .. } => format!(
                "This server now has **{}** premium. Thank you for supporting Guard-shin!",
                capitalize(tier_name)
            ),
            Self::Expired => "This server's premium subscription has ended. Premium features \
                              are no longer available."
                .to_string(),
        }
    }

    /// Feature list for activation notices; empty for expiry notices.
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Self::Activated { tier, .. } => tier.features(),
            Self::Expired => &[],
        }
    }

    /// Human readable expiry date, e.g. "March 05, 2025".
    pub fn expiry_display(&self) -> Option<String> {
        match self {
            Self::Activated {
                expires_at: Some(ts),
                ..
            } => DateTime::from_timestamp(*ts, 0).map(|dt| dt.format("%B %d, %Y").to_string()),
            _ => None,
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Snapshot of a guild text channel as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelView {
    pub id: u64,
    pub name: String,
    pub position: u16,
    /// Whether the bot may view the channel and send messages to it.
    pub postable: bool,
}

/// Snapshot of a resolved guild, detached from the gateway cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildView {
    pub id: String,
    pub name: String,
    pub system_channel_id: Option<u64>,
    /// Text channels only.
    pub channels: Vec<ChannelView>,
}

impl GuildView {
    /// Chooses the channel a premium notification is posted to.
    ///
    /// First match wins:
    /// 1. a postable text channel whose name contains "premium" or "bot"
    /// 2. the system channel, if postable
    /// 3. the first postable text channel by position
    ///
    /// Returns `None` when nothing is postable.
    pub fn notification_channel(&self) -> Option<u64> {
        let mut postable: Vec<&ChannelView> = self.channels.iter().filter(|c| c.postable).collect();
        postable.sort_by_key(|c| (c.position, c.id));

        if let Some(channel) = postable.iter().find(|c| {
            let name = c.name.to_lowercase();
            name.contains("premium") || name.contains("bot")
        }) {
            return Some(channel.id);
        }

        if let Some(system_id) = self.system_channel_id {
            if postable.iter().any(|c| c.id == system_id) {
                return Some(system_id);
            }
        }

        postable.first().map(|c| c.id)
    }
}
