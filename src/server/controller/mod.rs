//! HTTP request handlers.
//!
//! - `health` - Supervisor liveness probe, status page and fallback
//! - `webhook` - Worker payment and update webhooks

pub mod health;
pub mod webhook;
