//! Server-side domain models.
//!
//! This module contains the domain types shared by the data, service and controller layers:
//! entitlement records and update events, notification content, payment and update webhook
//! events, and the worker supervision snapshot. They carry no I/O of their own.

pub mod entitlement;
pub mod notification;
pub mod payment;
pub mod update_command;
pub mod watchdog;
