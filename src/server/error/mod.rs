//! Error types.
//!
//! `AppError` is the error that ends a process: it covers what can fail while the supervisor
//! or the worker starts up and runs. Domain errors live in the submodules. Webhook endpoints
//! answer with `WebhookError` directly since their response bodies follow the payment
//! provider's structured `{"success": false, ...}` convention, and per-item failures inside a
//! reconciliation batch are logged and counted by the reconciler instead.

pub mod config;
pub mod gateway;
pub mod store;
pub mod watchdog;
pub mod webhook;

use thiserror::Error;

use crate::server::error::config::ConfigError;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    ///
    /// Fatal at startup: the process exits non-zero.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Socket bind or server I/O error.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
