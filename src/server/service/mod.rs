//! Service layer for business logic and orchestration.
//!
//! This module sits between the HTTP controllers, the scheduler and the bot on one side and
//! the JSON-file stores on the other. Services are responsible for:
//!
//! - **Reconciliation**: Applying premium updates to the entitlement store exactly once
//! - **Supervision**: Keeping the worker process alive and publishing its state
//! - **Verification**: Checking webhook signatures before any payload is trusted
//! - **Gateway boundary**: The `GuildGateway` trait through which guilds are resolved and
//!   notifications delivered

pub mod gateway;
pub mod reconciler;
pub mod signature;
pub mod status;
pub mod watchdog;

#[cfg(test)]
pub mod fake_gateway;
