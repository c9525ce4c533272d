use thiserror::Error;

/// Errors that can occur while preparing a test environment.
#[derive(Error, Debug)]
pub enum TestError {
    /// Temporary directory or fixture file could not be created.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Fixture could not be encoded as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
