//! Shared state handed to the HTTP handlers.
//!
//! The supervisor and the worker run different servers, so each has its own state type.
//! Both are cloned per request through Axum's state extraction and contain only
//! reference-counted or channel handle fields.

use std::sync::Arc;

use tokio::sync::watch;

use crate::server::{
    model::watchdog::WatchdogSnapshot,
    service::{gateway::GuildGateway, reconciler::EntitlementReconciler},
};

/// State of the supervisor's health server.
#[derive(Clone)]
pub struct SupervisorState {
    /// Latest watchdog snapshot. Reading never blocks the monitoring loop.
    pub watchdog: watch::Receiver<WatchdogSnapshot>,
}

impl SupervisorState {
    pub fn new(watchdog: watch::Receiver<WatchdogSnapshot>) -> Self {
        Self { watchdog }
    }

    /// Copy of the current watchdog state.
    pub fn snapshot(&self) -> WatchdogSnapshot {
        self.watchdog.borrow().clone()
    }
}

/// State of the worker's webhook server.
#[derive(Clone)]
pub struct WorkerState {
    /// Reconciler the payment webhook feeds events into.
    pub reconciler: Arc<EntitlementReconciler>,

    /// Chat gateway, used by the update webhook to re-register commands.
    pub gateway: Arc<dyn GuildGateway>,

    /// Payment webhook signing secret. `None` disables the endpoint.
    pub stripe_webhook_secret: Option<Arc<str>>,

    /// Update webhook signing secret. `None` disables the endpoint.
    pub update_webhook_secret: Option<Arc<str>>,

    /// Whether `update_commands` requests may re-register commands.
    pub register_commands: bool,

    /// Set to `true` to shut the worker down gracefully.
    pub shutdown: Arc<watch::Sender<bool>>,
}
