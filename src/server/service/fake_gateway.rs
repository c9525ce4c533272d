//! In-memory `GuildGateway` for service and controller tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use serenity::async_trait;

use crate::server::{
    error::gateway::GatewayError,
    model::notification::{ChannelView, GuildView, PremiumNotification},
    service::gateway::GuildGateway,
};

/// A notification the fake was asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub guild_id: String,
    pub channel_id: u64,
    pub notification: PremiumNotification,
}

#[derive(Default)]
pub struct FakeGateway {
    guilds: Mutex<HashMap<String, GuildView>>,
    attempts: Mutex<Vec<SentNotification>>,
    fail_sends: bool,
    send_delay: Option<Duration>,
    resolve_delay: Option<Duration>,
    registrations: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guild with a single postable "general" channel (id 100).
    pub fn with_guild(self, guild_id: &str) -> Self {
        self.add_guild(guild_view(guild_id));
        self
    }

    /// Every send attempt fails as if no channel accepted the message.
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Every send attempt takes `delay` before succeeding.
    pub fn slow_sends(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    /// Every guild lookup takes `delay` before answering.
    pub fn slow_resolves(mut self, delay: Duration) -> Self {
        self.resolve_delay = Some(delay);
        self
    }

    pub fn add_guild(&self, view: GuildView) {
        lock(&self.guilds).insert(view.id.clone(), view);
    }

    /// Every notification attempt so far, including failed ones.
    pub fn attempts(&self) -> Vec<SentNotification> {
        lock(&self.attempts).clone()
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }
}

/// Guild view with one postable text channel.
pub fn guild_view(guild_id: &str) -> GuildView {
    GuildView {
        id: guild_id.to_string(),
        name: format!("Guild {}", guild_id),
        system_channel_id: None,
        channels: vec![ChannelView {
            id: 100,
            name: "general".to_string(),
            position: 0,
            postable: true,
        }],
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl GuildGateway for FakeGateway {
    async fn resolve_guild(&self, guild_id: &str) -> Option<GuildView> {
        if let Some(delay) = self.resolve_delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.guilds).get(guild_id).cloned()
    }

    async fn send_notification(
        &self,
        guild: &GuildView,
        channel_id: u64,
        notification: &PremiumNotification,
    ) -> Result<(), GatewayError> {
        lock(&self.attempts).push(SentNotification {
            guild_id: guild.id.clone(),
            channel_id,
            notification: notification.clone(),
        });

        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_sends {
            return Err(GatewayError::ChannelNotPostable(guild.id.clone()));
        }
        Ok(())
    }

    async fn register_commands(&self) -> Result<usize, GatewayError> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}
