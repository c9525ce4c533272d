//! File-backed storage for premium state.
//!
//! Both stores keep their data as JSON documents on disk so the payment side and the bot can
//! share them without a database. Writes go through a temporary file and a rename so readers
//! never observe a half-written document.

pub mod entitlement;
pub mod json_file;
pub mod update_event;

#[cfg(test)]
mod test;
