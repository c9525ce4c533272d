use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};

use crate::{
    model::api::HealthDto,
    server::{service::status::render_status_page, state::SupervisorState},
};

/// Liveness probe for load balancers and uptime monitors.
///
/// # Returns
/// - `200 OK` - Worker is running
/// - `503 Service Unavailable` - Worker is starting, crashed, stopped or not spawned yet
pub async fn health(State(state): State<SupervisorState>) -> impl IntoResponse {
    if state.snapshot().is_healthy() {
        (StatusCode::OK, Json(HealthDto::healthy()))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(HealthDto::unhealthy()))
    }
}

pub async fn status_page(State(state): State<SupervisorState>) -> Html<String> {
    Html(render_status_page(&state.snapshot()))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
