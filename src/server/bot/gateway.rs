use std::sync::Arc;

use serenity::{
    all::{
        Cache, ChannelId, ChannelType, Command, CreateEmbed, CreateMessage, Guild, GuildChannel,
        GuildId, Http, Timestamp,
    },
    async_trait,
};

use crate::server::{
    bot::commands,
    error::gateway::GatewayError,
    model::notification::{ChannelView, GuildView, PremiumNotification},
    service::gateway::GuildGateway,
};

/// `GuildGateway` backed by the running serenity client.
///
/// Guilds are resolved from the gateway cache, so a guild is only resolvable once its
/// `GUILD_CREATE` has been received after connecting.
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

#[async_trait]
impl GuildGateway for SerenityGateway {
    async fn resolve_guild(&self, guild_id: &str) -> Option<GuildView> {
        let guild_id = match guild_id.trim().parse::<u64>() {
            Ok(id) if id != 0 => GuildId::new(id),
            _ => {
                tracing::warn!("Ignoring malformed guild id '{}'", guild_id);
                return None;
            }
        };

        let guild = self.cache.guild(guild_id).map(|guild| Guild::clone(&guild))?;
        let bot_id = self.cache.current_user().id;

        let member = match guild.members.get(&bot_id) {
            Some(member) => member.clone(),
            None => match self.http.get_member(guild_id, bot_id).await {
                Ok(member) => member,
                Err(e) => {
                    tracing::warn!(
                        "Could not fetch own member in guild {}: {}",
                        guild_id,
                        e
                    );
                    return None;
                }
            },
        };

        Some(guild_view(&guild, |channel| {
            let permissions = guild.user_permissions_in(channel, &member);
            permissions.view_channel() && permissions.send_messages() && permissions.embed_links()
        }))
    }

    async fn send_notification(
        &self,
        guild: &GuildView,
        channel_id: u64,
        notification: &PremiumNotification,
    ) -> Result<(), GatewayError> {
        let message = CreateMessage::new().embed(notification_embed(notification));
        ChannelId::new(channel_id)
            .send_message(&self.http, message)
            .await?;

        tracing::info!(
            "Sent '{}' notification to channel {} in guild {}",
            notification.title(),
            channel_id,
            guild.id
        );

        Ok(())
    }

    async fn register_commands(&self) -> Result<usize, GatewayError> {
        let registered = Command::set_global_commands(&self.http, commands::all()).await?;
        Ok(registered.len())
    }
}

/// Detaches a cached guild into a `GuildView`.
///
/// Only text and announcement channels are kept.
///
/// # Arguments
/// - `guild`: Guild from the cache
/// - `can_post`: Whether the bot may post embeds in a given channel
pub fn guild_view(guild: &Guild, can_post: impl Fn(&GuildChannel) -> bool) -> GuildView {
    let channels = guild
        .channels
        .values()
        .filter(|channel| matches!(channel.kind, ChannelType::Text | ChannelType::News))
        .map(|channel| ChannelView {
            id: channel.id.get(),
            name: channel.name.clone(),
            position: channel.position,
            postable: can_post(channel),
        })
        .collect();

    GuildView {
        id: guild.id.get().to_string(),
        name: guild.name.clone(),
        system_channel_id: guild.system_channel_id.map(|id| id.get()),
        channels,
    }
}

/// Builds the embed posted for a premium notification.
pub fn notification_embed(notification: &PremiumNotification) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(notification.title())
        .description(notification.description())
        .color(notification.color())
        .timestamp(Timestamp::now());

    let features = notification.features();
    if !features.is_empty() {
        let list = features
            .iter()
            .map(|feature| format!("• {}", feature))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("Features", list, false);
    }

    if let Some(expiry) = notification.expiry_display() {
        embed = embed.field("Expires", expiry, true);
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::serenity::{create_test_channel, create_test_guild};

    /// Tests conversion of a cached guild into a view.
    ///
    /// Verifies that voice and category channels are dropped and that postability comes
    /// from the supplied permission check.
    ///
    /// Expected: two text channels, only "bot-spam" postable, system channel carried over
    #[test]
    fn guild_view_keeps_text_channels() {
        let guild = create_test_guild(
            42,
            "Test Guild",
            Some(10),
            vec![
                create_test_channel(10, 42, "general", 0, 0),
                create_test_channel(11, 42, "bot-spam", 0, 1),
                create_test_channel(12, 42, "Voice", 2, 2),
                create_test_channel(13, 42, "Category", 4, 3),
            ],
        );

        let mut view = guild_view(&guild, |channel| channel.name == "bot-spam");
        view.channels.sort_by_key(|c| c.id);

        assert_eq!(view.id, "42");
        assert_eq!(view.name, "Test Guild");
        assert_eq!(view.system_channel_id, Some(10));
        assert_eq!(view.channels.len(), 2);
        assert!(!view.channels[0].postable);
        assert!(view.channels[1].postable);
        assert_eq!(view.notification_channel(), Some(11));
    }

    /// Tests the activation embed content.
    ///
    /// Expected: title, green color, feature list and expiry field
    #[test]
    fn activation_embed_has_features_and_expiry() {
        let embed = notification_embed(&PremiumNotification::activated(
            "basic",
            Some(1_735_689_600),
        ));
        let json = serde_json::to_value(&embed).unwrap();

        assert_eq!(json["title"], "Premium Activated");
        assert_eq!(json["color"], 0x2ecc71);
        assert_eq!(json["fields"][0]["name"], "Features");
        assert!(json["fields"][0]["value"]
            .as_str()
            .unwrap()
            .contains("• Custom command prefix"));
        assert_eq!(json["fields"][1]["name"], "Expires");
        assert_eq!(json["fields"][1]["value"], "January 01, 2025");
    }

    /// Tests the expiry embed content.
    ///
    /// Expected: title and red color, no fields
    #[test]
    fn expiry_embed_has_no_fields() {
        let embed = notification_embed(&PremiumNotification::Expired);
        let json = serde_json::to_value(&embed).unwrap();

        assert_eq!(json["title"], "Premium Expired");
        assert_eq!(json["color"], 0xe74c3c);
        assert!(json.get("fields").map_or(true, |f| f.as_array().unwrap().is_empty()));
    }
}
