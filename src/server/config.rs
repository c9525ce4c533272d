use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use crate::server::error::config::ConfigError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEBHOOK_PORT: u16 = 5000;
const DEFAULT_POLL_SECS: u64 = 30;
const DEFAULT_BACKOFF_SECS: u64 = 10;
const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PREMIUM_FILE: &str = "data/premium_guilds.json";
const DEFAULT_UPDATES_FILE: &str = "data/premium_updates.json";

/// Argument that selects worker mode when passed to the binary.
pub const WORKER_MODE_ARG: &str = "worker";

/// Program and arguments the watchdog runs as the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl WorkerCommand {
    /// Parses a whitespace-separated command line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;

        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// This binary re-invoked in worker mode.
    pub fn current_exe() -> Result<Self, ConfigError> {
        let exe = std::env::current_exe().map_err(|e| ConfigError::InvalidValue {
            name: "WORKER_COMMAND".to_string(),
            value: String::new(),
            reason: format!("cannot locate own executable: {}", e),
        })?;

        Ok(Self {
            program: exe.to_string_lossy().into_owned(),
            args: vec![WORKER_MODE_ARG.to_string()],
        })
    }
}

impl fmt::Display for WorkerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Configuration of the supervisor process.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub port: u16,
    pub worker: WorkerCommand,
    pub poll_interval: Duration,
    pub backoff: Duration,
}

impl SupervisorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// `DISCORD_TOKEN` is not used by the supervisor itself but is required here so a
    /// deployment without credentials fails at once instead of crash-looping the worker.
    ///
    /// # Returns
    /// - `Ok(SupervisorConfig)` - All values present and valid
    /// - `Err(ConfigError::MissingEnvVar)` - `DISCORD_TOKEN` is not set
    /// - `Err(ConfigError::InvalidValue)` - A numeric variable does not parse
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        required(&lookup, "DISCORD_TOKEN")?;

        let worker = match optional(&lookup, "WORKER_COMMAND").and_then(|v| WorkerCommand::parse(&v))
        {
            Some(command) => command,
            None => WorkerCommand::current_exe()?,
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            worker,
            poll_interval: Duration::from_secs(parse_or(
                &lookup,
                "WATCHDOG_POLL_SECS",
                DEFAULT_POLL_SECS,
            )?),
            backoff: Duration::from_secs(parse_or(
                &lookup,
                "WATCHDOG_BACKOFF_SECS",
                DEFAULT_BACKOFF_SECS,
            )?),
        })
    }
}

/// Configuration of the worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub discord_token: String,
    pub webhook_port: u16,
    /// Payment webhook signing secret; the endpoint is disabled when unset.
    pub stripe_webhook_secret: Option<String>,
    /// Update webhook signing secret; the endpoint is disabled when unset.
    pub update_webhook_secret: Option<String>,
    pub premium_file: PathBuf,
    pub updates_file: PathBuf,
    pub register_commands: bool,
    pub notification_timeout: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let disable_registration = match optional(&lookup, "DISABLE_COMMAND_REGISTRATION") {
            Some(value) => parse_flag("DISABLE_COMMAND_REGISTRATION", &value)?,
            None => false,
        };

        Ok(Self {
            discord_token: required(&lookup, "DISCORD_TOKEN")?,
            webhook_port: parse_or(&lookup, "WEBHOOK_PORT", DEFAULT_WEBHOOK_PORT)?,
            stripe_webhook_secret: optional(&lookup, "STRIPE_WEBHOOK_SECRET"),
            update_webhook_secret: optional(&lookup, "UPDATE_WEBHOOK_SECRET"),
            premium_file: optional(&lookup, "PREMIUM_FILE")
                .unwrap_or_else(|| DEFAULT_PREMIUM_FILE.to_string())
                .into(),
            updates_file: optional(&lookup, "PREMIUM_UPDATES_FILE")
                .unwrap_or_else(|| DEFAULT_UPDATES_FILE.to_string())
                .into(),
            register_commands: !disable_registration,
            notification_timeout: Duration::from_secs(parse_or(
                &lookup,
                "NOTIFICATION_TIMEOUT_SECS",
                DEFAULT_NOTIFICATION_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Non-blank value of `name`, trimmed.
fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, ConfigError> {
    optional(lookup, name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(lookup, name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// Parses a boolean-like flag: `1/true/yes/on` and `0/false/no/off`, case-insensitive.
fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a boolean such as true/false".to_string(),
        }),
    }
}
