use serde::Serialize;
use utoipa::ToSchema;

/// Common success envelope
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse<T: Serialize> {
    /// Always true for success responses
    #[schema(example = true)]
    pub is_success: bool,

    #[schema(example = "COMMON200")]
    pub code: String,

    #[schema(example = "Success")]
    pub message: String,

    pub result: Option<T>,
}

impl<T: Serialize> BaseResponse<T> {
    pub fn success(result: T) -> Self {
        Self {
            is_success: true,
            code: "COMMON200".to_string(),
            message: "Success".to_string(),
            result: Some(result),
        }
    }
}

/// How the client should present a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Error envelope
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always false for error responses
    #[schema(example = false)]
    pub is_success: bool,

    #[schema(example = "AUTH_002")]
    pub code: String,

    #[schema(example = "Invalid password. Please try again.")]
    pub message: String,

    pub level: Severity,

    pub result: Option<()>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, level: Severity) -> Self {
        Self {
            is_success: false,
            code: code.into(),
            message: message.into(),
            level,
            result: None,
        }
    }
}
