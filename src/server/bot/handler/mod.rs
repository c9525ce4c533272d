use serenity::all::{Context, EventHandler, Guild, Interaction, Ready};
use serenity::async_trait;

use crate::server::data::entitlement::EntitlementStore;

pub mod guild;
pub mod interaction;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub store: EntitlementStore,
    pub register_commands: bool,
}

impl Handler {
    pub fn new(store: EntitlementStore, register_commands: bool) -> Self {
        Self {
            store,
            register_commands,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready, self.register_commands).await;
    }

    /// Called when a guild becomes available or the bot joins a new guild
    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        guild::handle_guild_create(&self.store, ctx, guild, is_new).await;
    }

    /// Called when a user invokes a slash command
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.store, ctx, interaction).await;
    }
}
