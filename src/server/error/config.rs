use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set.
    ///
    /// Fatal at startup; the process exits non-zero before anything is spawned.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable is set but cannot be parsed into the expected type.
    #[error("Invalid value '{value}' for environment variable {name}: {reason}")]
    InvalidValue {
        /// Name of the offending environment variable
        name: String,
        /// The raw value found in the environment
        value: String,
        /// Why the value was rejected
        reason: String,
    },
}
