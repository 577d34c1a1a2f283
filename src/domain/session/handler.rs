use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use super::dto::{LoginRequest, NotesForm, SessionView};
use crate::error::AppError;
use crate::global::ClientIp;
use crate::response::{BaseResponse, ErrorResponse};
use crate::AppState;

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::SessionNotFound(raw.to_string()))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScreenQuery {
    /// Screen the client is currently showing
    pub screen: Option<String>,
}

/// Start a session
///
/// New sessions begin on the login screen.
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Session",
    responses(
        (status = 201, description = "Session created", body = BaseResponse<SessionView>)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<BaseResponse<SessionView>>) {
    let view = state.session_service.start_session().await;
    (StatusCode::CREATED, Json(BaseResponse::success(view)))
}

/// Current screen of a session
///
/// A client restoring its page may pass the screen it shows. An unknown
/// value moves the session to the error screen; known values are ignored in
/// favour of the server's screen.
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    tag = "Session",
    params(
        ("session_id" = String, Path, description = "Session id"),
        ScreenQuery
    ),
    responses(
        (status = 200, description = "Session view", body = BaseResponse<SessionView>),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    query: Result<Query<ScreenQuery>, QueryRejection>,
) -> Result<Json<BaseResponse<SessionView>>, AppError> {
    let id = parse_session_id(&session_id)?;
    let Query(query) = query.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let view = state
        .session_service
        .view(id, query.screen.as_deref())
        .await?;
    Ok(Json(BaseResponse::success(view)))
}

/// End a session and discard its state
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    tag = "Session",
    params(("session_id" = String, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_session_id(&session_id)?;
    state.session_service.end_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit the login password
///
/// The correct password moves the session to the input screen. An empty
/// password is answered with a warning, a wrong one with an error; both leave
/// the session on the login screen. Wrong passwords are throttled per client
/// address across all of its sessions.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/login",
    tag = "Session",
    params(("session_id" = String, Path, description = "Session id")),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = BaseResponse<SessionView>),
        (status = 400, description = "Empty password (warning)", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Not on the login screen", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    client: ClientIp,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<SessionView>>, AppError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = request.map_err(AppError::from)?;

    tracing::info!(
        session_id = %id,
        client = client.as_str(),
        password_length = request.password.len(),
        "Login request received"
    );

    request.validate()?;

    let view = state
        .session_service
        .login(id, client.as_str(), &request.password)
        .await?;
    Ok(Json(BaseResponse::success(view)))
}

/// Enter the home screen
///
/// The home screen does not exist yet; this always fails with 501.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/home",
    tag = "Session",
    params(("session_id" = String, Path, description = "Session id")),
    responses(
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 501, description = "Not implemented", body = ErrorResponse)
    )
)]
pub async fn enter_home(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<BaseResponse<SessionView>>, AppError> {
    let id = parse_session_id(&session_id)?;
    let view = state.session_service.enter_home(id).await?;
    Ok(Json(BaseResponse::success(view)))
}

/// Submit class notes and generate study notes
///
/// Valid notes run the generation step. The response is the output view on
/// success or the error view (with a diagnostic) when generation failed.
/// Invalid input is rejected and the session stays on the input screen.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/notes",
    tag = "Session",
    params(("session_id" = String, Path, description = "Session id")),
    request_body = NotesForm,
    responses(
        (status = 200, description = "Output or error view", body = BaseResponse<SessionView>),
        (status = 400, description = "Invalid notes or options", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 409, description = "Not on the input screen", body = ErrorResponse),
        (status = 501, description = "Personalization requested", body = ErrorResponse)
    )
)]
pub async fn submit_notes(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    request: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BaseResponse<SessionView>>, AppError> {
    let id = parse_session_id(&session_id)?;
    let Json(body) = request.map_err(AppError::from)?;
    let form = NotesForm::from_json(&body)?;

    tracing::info!(
        session_id = %id,
        notes_chars = form.text.chars().count(),
        notes_type = ?form.settings.notes_type,
        notes_style = ?form.settings.notes_style,
        format = ?form.settings.format,
        "Notes submission received"
    );

    form.validate()?;

    let view = state.session_service.submit_notes(id, &form).await?;

    tracing::info!(session_id = %id, screen = %view.screen, "Notes submission handled");

    Ok(Json(BaseResponse::success(view)))
}
