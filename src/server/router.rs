use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::server::{
    controller::{
        health::{health, not_found, status_page},
        webhook::{payment_webhook, update_webhook},
    },
    state::{SupervisorState, WorkerState},
};

/// Routes served by the supervisor.
pub fn health_router(state: SupervisorState) -> Router {
    Router::new()
        .route("/", get(status_page))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes served by the worker.
pub fn webhook_router(state: WorkerState) -> Router {
    Router::new()
        .route("/webhook/stripe", post(payment_webhook))
        .route("/webhook/update", post(update_webhook))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
