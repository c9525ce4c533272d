use serenity::all::{Client, GatewayIntents};

use crate::server::{
    bot::handler::Handler, config::WorkerConfig, data::entitlement::EntitlementStore,
    error::AppError,
};

/// Builds the Discord bot client without connecting it.
///
/// The returned client exposes its HTTP client and cache, which the premium reconciler
/// uses through `SerenityGateway` to resolve guilds and post notifications.
///
/// # Arguments
/// - `config` - Worker configuration holding the bot token and registration flag
/// - `store` - Entitlement store queried by the `/premium` command
///
/// # Returns
/// - `Ok(Client)` - Client ready to be started with `start_bot`
/// - `Err(AppError)` - Client could not be built (e.g. malformed token)
pub async fn init_bot(config: &WorkerConfig, store: EntitlementStore) -> Result<Client, AppError> {
    // GUILDS is enough to cache guilds, channels and the bot's own member.
    let intents = GatewayIntents::GUILDS;

    let handler = Handler::new(store, config.register_commands);

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;

    Ok(client)
}

/// Starts the Discord bot in a blocking manner
///
/// This function connects the client to the gateway. It should be called from within
/// a tokio::spawn task since it will block until the bot shuts down.
///
/// # Returns
/// - `Ok(())` if the bot ran and was shut down
/// - `Err(AppError)` if the connection fails (e.g. invalid token)
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
