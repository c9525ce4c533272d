//! Ready event handler for bot initialization.
//!
//! This module handles the `ready` event which is fired when the bot successfully
//! connects to Discord's gateway and completes the initial handshake. It indicates the
//! bot is ready to process other events.
//!
//! The ready handler is used to:
//! - Log connection information
//! - Set the bot's activity status
//! - Register application commands (unless disabled by configuration)

use serenity::all::{ActivityData, Command, Context, Ready};

use crate::server::bot::commands;

/// Handles the ready event when the bot connects to Discord.
///
/// Fires once per gateway connection, including reconnects, so command registration is
/// repeated on every reconnect. Registration is idempotent on Discord's side.
///
/// # Arguments
/// - `ctx` - Discord context for setting activity status and registering commands
/// - `ready` - Ready event data containing bot user information
/// - `register_commands` - Whether to overwrite the global command list
pub async fn handle_ready(ctx: Context, ready: Ready, register_commands: bool) {
    tracing::info!(
        "{} is connected to Discord ({} guilds)",
        ready.user.name,
        ready.guilds.len()
    );

    ctx.set_activity(Some(ActivityData::watching("over premium servers")));

    if !register_commands {
        tracing::info!("Command registration disabled, keeping existing commands");
        return;
    }

    match Command::set_global_commands(&ctx.http, commands::all()).await {
        Ok(registered) => tracing::info!("Registered {} application commands", registered.len()),
        Err(e) => tracing::error!("Failed to register application commands: {}", e),
    }
}
