use serenity::async_trait;

use crate::server::{
    error::gateway::GatewayError,
    model::notification::{GuildView, PremiumNotification},
};

/// Boundary to the chat gateway used by the reconciler and the update webhook.
///
/// The production implementation is backed by the serenity cache and HTTP client
/// (`bot::gateway::SerenityGateway`); tests substitute an in-memory fake.
#[async_trait]
pub trait GuildGateway: Send + Sync {
    /// Looks up a guild the bot is a member of.
    ///
    /// # Arguments
    /// - `guild_id`: Guild identifier as received from the payment side
    ///
    /// # Returns
    /// - `Some(GuildView)` - Guild is known, with per-channel postability resolved
    /// - `None` - Bot is not a member, the guild is not cached yet, or the id is malformed
    async fn resolve_guild(&self, guild_id: &str) -> Option<GuildView>;

    /// Posts a premium notification to a channel of a resolved guild.
    ///
    /// # Arguments
    /// - `guild`: Guild the notification concerns
    /// - `channel_id`: Channel chosen by `GuildView::notification_channel`
    /// - `notification`: Content to render
    async fn send_notification(
        &self,
        guild: &GuildView,
        channel_id: u64,
        notification: &PremiumNotification,
    ) -> Result<(), GatewayError>;

    /// Registers the bot's application commands globally.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of commands now registered
    /// - `Err(GatewayError)` - Registration request failed
    async fn register_commands(&self) -> Result<usize, GatewayError>;
}
