use axum::{body::Bytes, extract::State, http::HeaderMap, Json};

use crate::{
    model::api::WebhookResponseDto,
    server::{
        error::webhook::WebhookError,
        model::{
            payment::{PaymentEvent, StripeEnvelope},
            update_command::{UpdateCommand, UpdatePayload},
        },
        service::{
            reconciler::EventOutcome,
            signature::{
                verify_stripe_signature, verify_update_signature, STRIPE_SIGNATURE_HEADER,
                UPDATE_SIGNATURE_HEADER,
            },
        },
        state::WorkerState,
    },
};

/// Receives payment provider events.
///
/// The raw body is verified against the signing secret before it is parsed. Handled event
/// types are converted to an update event and applied immediately; events that cannot be
/// applied yet are queued for the next sweep.
///
/// # Returns
/// - `200 OK` - Event applied, queued, or acknowledged as unhandled
/// - `400 Bad Request` - Signature or payload rejected; nothing was changed
/// - `404 Not Found` - No signing secret configured
/// - `500 Internal Server Error` - Event could neither be applied nor queued
pub async fn payment_webhook(
    State(state): State<WorkerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponseDto>, WebhookError> {
    let secret = state
        .stripe_webhook_secret
        .as_deref()
        .ok_or(WebhookError::Disabled)?;
    let signature = signature_header(&headers, STRIPE_SIGNATURE_HEADER)?;

    if let Err(e) = verify_stripe_signature(secret, signature, &body, chrono::Utc::now().timestamp())
    {
        tracing::warn!("Rejected payment webhook: {}", e);
        return Err(e);
    }

    let envelope: StripeEnvelope = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    tracing::info!(
        "Received payment event {} ({})",
        envelope.kind,
        envelope.id
    );

    let update = match PaymentEvent::from_envelope(envelope).into_update_event()? {
        Some(update) => update,
        None => {
            tracing::info!("Ignoring unhandled payment event type");
            return Ok(Json(WebhookResponseDto::unhandled()));
        }
    };

    let outcome = state
        .reconciler
        .apply_immediate(update)
        .await
        .map_err(|e| WebhookError::Internal(e.to_string()))?;

    if let EventOutcome::Unresolved | EventOutcome::StoreFailed = outcome {
        tracing::info!("Payment event queued for the next premium sweep");
    }

    Ok(Json(WebhookResponseDto::ok()))
}

/// Receives operational commands from the deployment side.
///
/// # Returns
/// - `200 OK` - Command carried out (or ignored if unknown)
/// - `400 Bad Request` - Signature or payload rejected
/// - `404 Not Found` - No signing secret configured
/// - `500 Internal Server Error` - Command registration failed
pub async fn update_webhook(
    State(state): State<WorkerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponseDto>, WebhookError> {
    let secret = state
        .update_webhook_secret
        .as_deref()
        .ok_or(WebhookError::Disabled)?;
    let signature = signature_header(&headers, UPDATE_SIGNATURE_HEADER)?;

    if let Err(e) = verify_update_signature(secret, signature, &body) {
        tracing::warn!("Rejected update webhook: {}", e);
        return Err(e);
    }

    let payload: UpdatePayload = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    let command = UpdateCommand::from(payload);

    match &command {
        UpdateCommand::Restart => {
            tracing::warn!("Restart requested via update webhook, shutting down worker");
            state.shutdown.send_replace(true);
        }
        UpdateCommand::UpdateCommands if !state.register_commands => {
            tracing::info!("Command update requested but command registration is disabled");
        }
        UpdateCommand::UpdateCommands => {
            let count = state.gateway.register_commands().await.map_err(|e| {
                tracing::error!("Failed to register commands: {}", e);
                WebhookError::Internal(e.to_string())
            })?;
            tracing::info!("Registered {} application commands", count);
        }
        UpdateCommand::Unknown(kind) => {
            tracing::warn!("Ignoring unknown update webhook type '{}'", kind);
        }
    }

    Ok(Json(WebhookResponseDto::action(command.as_str())))
}

fn signature_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .ok_or(WebhookError::MissingSignature)?
        .to_str()
        .map_err(|_| WebhookError::InvalidSignatureFormat("header is not ASCII".to_string()))
}
