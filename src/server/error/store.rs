use std::path::PathBuf;
use thiserror::Error;

/// Write-side failures of the JSON file stores.
///
/// Read-side problems (missing or malformed files) never surface as errors; the stores
/// log them and fall back to empty state. Only an unwritable medium is reported here.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem operation on the store file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// File (or temporary sibling) being written
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-memory state could not be encoded as JSON.
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
