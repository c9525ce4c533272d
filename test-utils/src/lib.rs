//! Guard-shin Test Utils
//!
//! Provides shared testing utilities for the guard-shin supervisor and worker. This crate
//! offers a builder for temporary data directories seeded with entitlement and update-event
//! files, JSON fixtures for the store and webhook payloads, and Serenity object factories.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Temporary directory with store file paths and read helpers
//! - **TestError**: Error types that can occur during test setup
//! - **fixture**: Store contents, update events, and signed webhook payloads
//! - **serenity**: Guild and channel factories
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, fixture};
//!
//! #[tokio::test]
//! async fn test_sweep() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_update_events(vec![fixture::update_event("42", Some("basic"), None, false)])
//!         .build()
//!         .await?;
//!
//!     let store = EntitlementStore::new(&test.premium_path);
//!     // Run the reconciler...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod fixture;
pub mod serenity;
