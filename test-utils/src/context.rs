use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::TestError;

/// File name of the entitlement store inside the test directory.
pub const PREMIUM_FILE_NAME: &str = "premium_guilds.json";
/// File name of the shared update-event file inside the test directory.
pub const UPDATE_FILE_NAME: &str = "premium_updates.json";

/// Test context owning an isolated temporary data directory.
///
/// The directory (and every file in it) is deleted when the context is dropped, so keep
/// the context alive for the duration of the test.
pub struct TestContext {
    /// Temporary directory holding the store files.
    pub dir: TempDir,

    /// Path of the entitlement store file. May not exist if it was not seeded.
    pub premium_path: PathBuf,

    /// Path of the update-event file. May not exist if it was not seeded.
    pub updates_path: PathBuf,
}

impl TestContext {
    /// Creates a context with an empty temporary directory.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Directory created, no files seeded
    /// - `Err(TestError::Io)` - Temporary directory could not be created
    pub fn new() -> Result<Self, TestError> {
        let dir = tempfile::tempdir()?;
        let premium_path = dir.path().join(PREMIUM_FILE_NAME);
        let updates_path = dir.path().join(UPDATE_FILE_NAME);

        Ok(Self {
            dir,
            premium_path,
            updates_path,
        })
    }

    /// Path of an arbitrary file inside the test directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `value` as pretty JSON to `path`.
    pub async fn write_json(&self, path: &Path, value: &Value) -> Result<(), TestError> {
        tokio::fs::write(path, serde_json::to_vec_pretty(value)?).await?;
        Ok(())
    }

    /// Writes raw text to `path`, e.g. to simulate a corrupt file.
    pub async fn write_raw(&self, path: &Path, contents: &str) -> Result<(), TestError> {
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    /// Reads and decodes the JSON file at `path`.
    ///
    /// # Panics
    /// - If the file is missing or not valid JSON (the test expected it to be written)
    pub async fn read_json(&self, path: &Path) -> Value {
        let bytes = tokio::fs::read(path)
            .await
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|e| panic!("{} is not valid JSON: {}", path.display(), e))
    }

    /// Reads the entitlement store file.
    pub async fn read_premium_file(&self) -> Value {
        self.read_json(&self.premium_path).await
    }

    /// Reads the update-event file.
    pub async fn read_update_file(&self) -> Value {
        self.read_json(&self.updates_path).await
    }
}
