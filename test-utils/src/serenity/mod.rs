//! Test factories for creating Serenity API objects.
//!
//! These factories create valid Serenity objects by deserializing JSON, simulating what
//! Discord's API would return.
//!
//! # Available Factories
//!
//! - `guild::create_test_guild` - Create Serenity Guild objects
//! - `channel::create_test_channel` - Create Serenity GuildChannel objects

pub mod channel;
pub mod guild;

pub use channel::create_test_channel;
pub use guild::create_test_guild;
