//! Premium entitlement reconciliation.
//!
//! The reconciler turns `UpdateEvent`s into entitlement store changes plus a notification in
//! the affected guild. Events arrive on two paths:
//!
//! - **Sweep**: the scheduler periodically reconciles every unprocessed event in the shared
//!   update file and writes the file back with `processed` flags updated.
//! - **Immediate**: the payment webhook hands over a single event. If it cannot be applied
//!   right now it is appended to the update file for the next sweep.
//!
//! Both paths run under the same batch lock, so the read-modify-write cycles on the store
//! and the update file never interleave.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::server::{
    data::{
        entitlement::EntitlementStore,
        update_event::{UpdateEntry, UpdateEventStore},
    },
    error::{gateway::GatewayError, store::StoreError},
    model::{
        entitlement::{Tier, UpdateEvent},
        notification::{GuildView, PremiumNotification},
    },
    service::gateway::GuildGateway,
};


/// What happened to a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Event was already applied by an earlier pass; nothing was done.
    AlreadyProcessed,
    /// Tier stored; `notified` tells whether the activation notice was delivered.
    Granted { notified: bool },
    /// Entitlement removed; `notified` tells whether the expiry notice was delivered.
    Revoked { notified: bool },
    /// Guild could not be resolved; the event stays pending.
    Unresolved,
    /// The store could not be written; the event stays pending.
    StoreFailed,
}

impl EventOutcome {
    /// Whether the event's `processed` flag is flipped by this outcome.
    ///
    /// A failed notification still counts as processed: the entitlement change is durable and
    /// must not be replayed just because a message could not be delivered.
    pub fn marks_processed(&self) -> bool {
        matches!(self, Self::Granted { .. } | Self::Revoked { .. })
    }
}

/// Counters for one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub granted: usize,
    pub revoked: usize,
    pub already_processed: usize,
    pub unresolved: usize,
    pub store_failures: usize,
    pub notification_failures: usize,
    /// Entries in the update file that are not valid events; left as they are.
    pub malformed: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: EventOutcome) {
        match outcome {
            EventOutcome::AlreadyProcessed => self.already_processed += 1,
            EventOutcome::Granted { notified } => {
                self.granted += 1;
                self.notification_failures += usize::from(!notified);
            }
            EventOutcome::Revoked { notified } => {
                self.revoked += 1;
                self.notification_failures += usize::from(!notified);
            }
            EventOutcome::Unresolved => self.unresolved += 1,
            EventOutcome::StoreFailed => self.store_failures += 1,
        }
    }

    /// Number of events applied in this pass.
    pub fn applied(&self) -> usize {
        self.granted + self.revoked
    }

    /// Number of events left pending for the next pass.
    pub fn pending(&self) -> usize {
        self.unresolved + self.store_failures
    }
}

pub struct EntitlementReconciler {
    store: EntitlementStore,
    updates: UpdateEventStore,
    gateway: Arc<dyn GuildGateway>,
    dispatch_timeout: Duration,
    batch_lock: Mutex<()>,
}

impl EntitlementReconciler {
    /// Creates a reconciler.
    ///
    /// # Arguments
    /// - `store`: Entitlement store this reconciler is the sole writer of
    /// - `updates`: Shared update-event file
    /// - `gateway`: Chat gateway used to resolve guilds and post notifications
    /// - `dispatch_timeout`: Upper bound for a single notification delivery
    pub fn new(
        store: EntitlementStore,
        updates: UpdateEventStore,
        gateway: Arc<dyn GuildGateway>,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            updates,
            gateway,
            dispatch_timeout,
            batch_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &EntitlementStore {
        &self.store
    }

    /// Reconciles the shared update file.
    ///
    /// Loads every event, applies the unprocessed ones in file order, then writes the whole
    /// list back. Entries that are not valid events are skipped and written back unchanged.
    /// An empty (or unreadable) file is left untouched.
    ///
    /// # Returns
    /// - `Ok(BatchReport)` - Pass completed; per-event failures are counted, not returned
    /// - `Err(StoreError)` - Update file could not be written back; applied events will be
    ///   seen as unprocessed by the next pass but are idempotent at the store level
    pub async fn sweep(&self) -> Result<BatchReport, StoreError> {
        let _batch = self.batch_lock.lock().await;

        let mut entries = self.updates.load().await;
        if entries.is_empty() {
            return Ok(BatchReport::default());
        }

        let report = self.reconcile_batch(&mut entries).await;
        self.updates.save(&entries).await?;

        if report.applied() > 0 || report.pending() > 0 || report.malformed > 0 {
            tracing::info!(
                "Premium sweep: {} granted, {} revoked, {} pending, {} malformed, {} notification failures",
                report.granted,
                report.revoked,
                report.pending(),
                report.malformed,
                report.notification_failures
            );
        }

        Ok(report)
    }

    /// Applies a single event received from the payment webhook.
    ///
    /// An event that cannot be applied right away (unresolved guild, store write failure)
    /// is appended to the update file unprocessed so the next sweep retries it.
    ///
    /// # Returns
    /// - `Ok(EventOutcome)` - Event applied, or queued for the next sweep
    /// - `Err(StoreError)` - Event could neither be applied nor queued
    pub async fn apply_immediate(&self, mut event: UpdateEvent) -> Result<EventOutcome, StoreError> {
        let _batch = self.batch_lock.lock().await;

        let outcome = self.reconcile_event(&event).await;
        if outcome.marks_processed() {
            return Ok(outcome);
        }

        tracing::info!(
            "Queueing premium update for guild {} for the next sweep",
            event.guild_id
        );
        event.processed = false;
        self.updates.append(event).await?;

        Ok(outcome)
    }

    /// Waits until no pass is running. Used during shutdown.
    pub async fn wait_idle(&self) {
        let _batch = self.batch_lock.lock().await;
    }

    /// Applies every unprocessed event in order, flipping `processed` on those applied.
    ///
    /// Caller must hold the batch lock. Failures are isolated per event.
    async fn reconcile_batch(&self, entries: &mut [UpdateEntry]) -> BatchReport {
        let mut report = BatchReport::default();

        for entry in entries.iter_mut() {
            let UpdateEntry::Event(event) = entry else {
                report.malformed += 1;
                continue;
            };

            let outcome = if event.processed {
                EventOutcome::AlreadyProcessed
            } else {
                self.reconcile_event(event).await
            };

            if outcome.marks_processed() {
                event.processed = true;
            }
            report.record(outcome);
        }

        report
    }

    async fn reconcile_event(&self, event: &UpdateEvent) -> EventOutcome {
        let resolved = tokio::time::timeout(
            self.dispatch_timeout,
            self.gateway.resolve_guild(&event.guild_id),
        )
        .await;
        let guild = match resolved {
            Ok(Some(guild)) => guild,
            Ok(None) => {
                tracing::warn!(
                    "Guild {} is not resolvable yet, leaving premium update pending",
                    event.guild_id
                );
                return EventOutcome::Unresolved;
            }
            Err(_) => {
                tracing::warn!(
                    "Resolving guild {} timed out after {:?}, leaving premium update pending",
                    event.guild_id,
                    self.dispatch_timeout
                );
                return EventOutcome::Unresolved;
            }
        };

        let expires_at = event.effective_expiry();

        let notification = match event.granted_tier() {
            Some(tier_name) => {
                let tier = Tier::from_name(tier_name);
                if let Err(e) = self.store.upsert(&event.guild_id, tier, expires_at).await {
                    tracing::error!(
                        "Failed to store {} premium for guild {}: {}",
                        tier,
                        event.guild_id,
                        e
                    );
                    return EventOutcome::StoreFailed;
                }
                tracing::info!(
                    "Premium tier {} applied to guild {} ({})",
                    tier_name,
                    guild.name,
                    event.guild_id
                );
                PremiumNotification::activated(tier_name, expires_at)
            }
            None => {
                match self.store.remove(&event.guild_id).await {
                    Ok(true) => tracing::info!(
                        "Premium removed from guild {} ({})",
                        guild.name,
                        event.guild_id
                    ),
                    Ok(false) => tracing::info!(
                        "Premium removal for guild {} found no stored entitlement",
                        event.guild_id
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to remove premium for guild {}: {}",
                            event.guild_id,
                            e
                        );
                        return EventOutcome::StoreFailed;
                    }
                }
                PremiumNotification::Expired
            }
        };

        let notified = match self.notify(&guild, &notification).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "{} notification for guild {} not delivered: {}",
                    notification.title(),
                    event.guild_id,
                    e
                );
                false
            }
        };

        match notification {
            PremiumNotification::Activated { .. } => EventOutcome::Granted { notified },
            PremiumNotification::Expired => EventOutcome::Revoked { notified },
        }
    }

    /// Delivers `notification` to the guild's preferred channel within the dispatch timeout.
    async fn notify(
        &self,
        guild: &GuildView,
        notification: &PremiumNotification,
    ) -> Result<(), GatewayError> {
        let channel_id = guild
            .notification_channel()
            .ok_or_else(|| GatewayError::ChannelNotPostable(guild.id.clone()))?;

        tokio::time::timeout(
            self.dispatch_timeout,
            self.gateway
                .send_notification(guild, channel_id, notification),
        )
        .await
        .map_err(|_| GatewayError::Timeout(self.dispatch_timeout))?
    }
}
