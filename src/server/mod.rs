//! Supervisor, worker and premium reconciliation backend.
//!
//! The binary runs in one of two modes. The **supervisor** keeps a worker process alive and
//! reports its liveness over HTTP. The **worker** runs the Discord bot, reconciles premium
//! entitlements from the payment provider and serves the payment and update webhooks. The
//! backend uses Axum as the web framework and Serenity for Discord integration; state is kept
//! in JSON files.
//!
//! # Architecture
//!
//! The server follows a layered architecture with clear separation of concerns:
//!
//! - **Controller Layer** (`controller/`) - HTTP request handlers for health and webhooks
//! - **Service Layer** (`service/`) - Reconciliation, supervision and signature verification
//! - **Data Layer** (`data/`) - JSON-file entitlement store and update-event file
//! - **Model Layer** (`model/`) - Domain models for entitlements, payments and supervision
//! - **Error Layer** (`error/`) - Application error types and HTTP response mapping
//!
//! # Infrastructure
//!
//! Supporting modules provide application infrastructure:
//!
//! - **Configuration** (`config`) - Environment-based configuration for both modes
//! - **State** (`state`) - Shared handler state (watchdog snapshot, reconciler, secrets)
//! - **Startup** (`startup`) - Tracing, signal handling and the two run modes
//! - **Router** (`router`) - Axum route configuration for both servers
//! - **Scheduler** (`scheduler/`) - Cron job running the premium sweep every minute
//! - **Bot** (`bot/`) - Discord event handlers and the gateway used by the reconciler
//!
//! # Premium Update Flow
//!
//! 1. **Payment provider** posts a signed event to the worker's webhook, or the payment side
//!    appends an update to the shared update file
//! 2. **Controller** verifies the signature and maps the event to an `UpdateEvent`
//! 3. **Reconciler** resolves the guild, writes the entitlement store and posts a notification
//! 4. **Scheduler** retries anything left pending on its next sweep

pub mod bot;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
