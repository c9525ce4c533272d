use serde::{Deserialize, Serialize};

/// Body of `GET /health` on the supervisor.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthDto {
    pub status: String,
    pub message: String,
}

impl HealthDto {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: "Bot is running".to_string(),
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: "Bot is not running".to_string(),
        }
    }
}

/// Body returned by the payment and update webhook endpoints.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookResponseDto {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `false` when the event type was acknowledged but not acted upon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled: Option<bool>,
    /// Update-webhook action that was carried out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl WebhookResponseDto {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            handled: Some(true),
            action: None,
        }
    }

    pub fn unhandled() -> Self {
        Self {
            handled: Some(false),
            ..Self::ok()
        }
    }

    pub fn action(action: &str) -> Self {
        Self {
            success: true,
            error: None,
            handled: None,
            action: Some(action.to_string()),
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            handled: None,
            action: None,
        }
    }
}
