//! Discord bot integration.
//!
//! The bot runs inside the worker process. Besides answering the `/premium` command it
//! provides the reconciler's view of Discord: `SerenityGateway` resolves guilds from the
//! gateway cache and posts premium notifications through the bot's HTTP client.
//!
//! The bot is started in a separate tokio task so it does not block the webhook server.
//!
//! # Gateway Intents
//!
//! The bot only requires the non-privileged `GUILDS` intent. Guild, channel and role data
//! plus the bot's own member object arrive with `GUILD_CREATE`, which is all the
//! channel-permission check needs.

pub mod commands;
pub mod gateway;
pub mod handler;
pub mod start;
