//! Slash command interaction handler.

use serenity::all::{
    Context, CreateInteractionResponse, CreateInteractionResponseMessage, Interaction,
};

use crate::server::{
    bot::commands::{premium_status_embed, PREMIUM_COMMAND},
    data::entitlement::EntitlementStore,
};

/// Handles an incoming interaction.
///
/// Only application commands are answered; other interaction kinds are ignored.
///
/// # Arguments
/// - `store` - Entitlement store queried by `/premium`
/// - `ctx` - Discord context for sending the response
/// - `interaction` - The interaction to answer
pub async fn handle_interaction(store: &EntitlementStore, ctx: Context, interaction: Interaction) {
    let Interaction::Command(command) = interaction else {
        return;
    };

    let message = match command.data.name.as_str() {
        PREMIUM_COMMAND => match command.guild_id {
            Some(guild_id) => {
                let record = store.get(&guild_id.get().to_string()).await;
                CreateInteractionResponseMessage::new().embed(premium_status_embed(
                    record.as_ref(),
                    chrono::Utc::now().timestamp(),
                ))
            }
            None => CreateInteractionResponseMessage::new()
                .content("This command can only be used in a server."),
        },
        other => {
            tracing::debug!("Ignoring unknown command /{}", other);
            return;
        }
    };

    if let Err(e) = command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(message.ephemeral(true)),
        )
        .await
    {
        tracing::error!("Failed to respond to /{}: {}", command.data.name, e);
    }
}
