use serde_json::Value;

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with seeded store files.
///
/// Provides a fluent interface for configuring the temporary data directory used by store,
/// reconciler and webhook tests. Files that are not seeded are left absent, which is how a
/// fresh deployment looks.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::{builder::TestBuilder, fixture};
///
/// let test = TestBuilder::new()
///     .with_update_events(vec![fixture::update_event("42", Some("standard"), None, false)])
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct TestBuilder {
    /// Contents of the entitlement store file, if it should exist.
    premium: Option<Value>,

    /// Contents of the update-event file, if it should exist.
    updates: Option<Value>,
}

impl TestBuilder {
    /// Creates a builder with no files seeded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the entitlement store file with arbitrary JSON.
    ///
    /// Use `fixture::premium_mapping` or `fixture::legacy_premium_list` to build the value.
    pub fn with_premium_file(mut self, contents: Value) -> Self {
        self.premium = Some(contents);
        self
    }

    /// Seeds the update-event file with the given events.
    pub fn with_update_events(mut self, events: Vec<Value>) -> Self {
        self.updates = Some(Value::Array(events));
        self
    }

    /// Creates the temporary directory and writes the seeded files.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Directory ready with the requested files
    /// - `Err(TestError)` - Directory or file creation failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let context = TestContext::new()?;

        if let Some(premium) = &self.premium {
            context.write_json(&context.premium_path, premium).await?;
        }

        if let Some(updates) = &self.updates {
            context.write_json(&context.updates_path, updates).await?;
        }

        Ok(context)
    }
}
