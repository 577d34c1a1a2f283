use axum::{extract::State, Json};

use super::dto::HealthStatus;
use super::service::check_health;
use crate::AppState;

/// Health check
///
/// Server status, version, uptime, active sessions and prompt template
/// completeness.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let active_sessions = state.session_service.session_count().await;
    Json(check_health(&state.template, active_sessions))
}

/// Prometheus metrics in text exposition format.
///
/// Empty when no recorder was installed.
pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
