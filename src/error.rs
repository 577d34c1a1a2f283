use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::response::{ErrorResponse, Severity};

/// Application-wide error type.
///
/// Each variant maps to an error code, an HTTP status and a severity.
/// Recoverable session errors (credential and input checks) never change the
/// current screen; the rest are surfaced to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please enter your password, then try again.")]
    EmptyCredential,

    #[error("Invalid password. Please try again.")]
    InvalidCredential,

    #[error("Too many login attempts. Try again in {0} seconds.")]
    LoginRateLimited(u64),

    #[error("Oops! It looks like you forgot to enter your notes.")]
    EmptyNotes,

    #[error("Please enter at least {min} characters of notes before continuing (got {actual}).")]
    NotesTooShort { min: usize, actual: usize },

    #[error("Notes may not exceed {max} characters (got {actual}).")]
    NotesTooLong { max: usize, actual: usize },

    #[error("Invalid notes options: {0}")]
    InvalidOptions(String),

    #[error("Prompt template has no fragment for {category}.{key}")]
    TemplateMissingFragment { category: String, key: String },

    #[error("Failed to load prompt template: {0}")]
    TemplateLoad(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Text generation service rejected the API key")]
    GenerationAuth,

    #[error("Text generation service rate limit exceeded")]
    GenerationRateLimit,

    #[error("Text generation timed out after {0} seconds")]
    GenerationTimeout(u64),

    #[error("Invalid screen state: {0}")]
    UnknownState(String),

    #[error("Action '{action}' is not available on the {screen} screen")]
    InvalidTransition { screen: String, action: &'static str },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("{0} is not yet implemented")]
    NotImplemented(&'static str),

    #[error("{0}")]
    ValidationError(String),

    #[error("Malformed request body: {0}")]
    JsonParseFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::EmptyCredential => "AUTH_001",
            AppError::InvalidCredential => "AUTH_002",
            AppError::LoginRateLimited(_) => "AUTH_003",
            AppError::EmptyNotes => "NOTES_001",
            AppError::NotesTooShort { .. } => "NOTES_002",
            AppError::NotesTooLong { .. } => "NOTES_003",
            AppError::InvalidOptions(_) => "NOTES_004",
            AppError::TemplateMissingFragment { .. } => "TEMPLATE_001",
            AppError::TemplateLoad(_) => "TEMPLATE_002",
            AppError::Generation(_) => "AI_001",
            AppError::GenerationAuth => "AI_002",
            AppError::GenerationRateLimit => "AI_003",
            AppError::GenerationTimeout(_) => "AI_004",
            AppError::UnknownState(_) => "SESSION_001",
            AppError::InvalidTransition { .. } => "SESSION_002",
            AppError::SessionNotFound(_) => "SESSION_003",
            AppError::NotImplemented(_) => "COMMON501",
            AppError::ValidationError(_) | AppError::JsonParseFailed(_) => "COMMON400",
            AppError::Internal(_) => "COMMON500",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyCredential
            | AppError::EmptyNotes
            | AppError::NotesTooShort { .. }
            | AppError::NotesTooLong { .. }
            | AppError::InvalidOptions(_)
            | AppError::ValidationError(_)
            | AppError::JsonParseFailed(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AppError::LoginRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Generation(_) | AppError::GenerationAuth => StatusCode::BAD_GATEWAY,
            AppError::GenerationRateLimit => StatusCode::SERVICE_UNAVAILABLE,
            AppError::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::TemplateMissingFragment { .. }
            | AppError::TemplateLoad(_)
            | AppError::UnknownState(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Warnings ask the user to adjust their input; errors report a failure.
    pub fn severity(&self) -> Severity {
        match self {
            AppError::EmptyCredential | AppError::NotesTooShort { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether the session stays on its current screen after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::EmptyCredential
                | AppError::InvalidCredential
                | AppError::LoginRateLimited(_)
                | AppError::EmptyNotes
                | AppError::NotesTooShort { .. }
                | AppError::NotesTooLong { .. }
                | AppError::InvalidOptions(_)
                | AppError::ValidationError(_)
                | AppError::JsonParseFailed(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
        } else {
            tracing::warn!(code, error = %message, "Request rejected");
        }

        let body = ErrorResponse::new(code, message, self.severity());
        (status, Json(body)).into_response()
    }
}

/// Body rejections are parse failures. Option values are checked separately
/// by [`crate::domain::session::NotesForm::from_json`].
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonParseFailed(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}
