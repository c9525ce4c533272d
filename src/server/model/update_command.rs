//! Commands carried by the signed update webhook.

use serde::Deserialize;

/// Raw update webhook body.
#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Operational command requested through the update webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCommand {
    /// Shut the worker down gracefully; the supervisor starts a fresh one.
    Restart,
    /// Re-register the bot's slash commands with Discord.
    UpdateCommands,
    /// Anything else. Logged and ignored.
    Unknown(String),
}

impl UpdateCommand {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "restart" => Self::Restart,
            "update_commands" => Self::UpdateCommands,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Restart => "restart",
            Self::UpdateCommands => "update_commands",
            Self::Unknown(kind) => kind,
        }
    }
}

impl From<UpdatePayload> for UpdateCommand {
    fn from(payload: UpdatePayload) -> Self {
        UpdateCommand::from_type(&payload.kind)
    }
}
