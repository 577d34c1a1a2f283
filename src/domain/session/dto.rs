use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::state::Screen;
use crate::domain::prompt::{NoteSettings, NotesOptions};
use crate::error::AppError;

/// Login screen submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Shared application password; empty is answered with a warning
    #[serde(default)]
    #[validate(length(max = 256, message = "Password is too long"))]
    pub password: String,
}

/// Input screen submission
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotesForm {
    /// Class notes to rewrite (100 to 10000 characters)
    #[serde(default)]
    pub text: String,

    /// Formatting and content choices; omitted fields use the form defaults
    #[serde(flatten)]
    pub settings: NoteSettings,

    /// Personalization: not yet available
    #[validate(length(max = 100, message = "Name is too long"))]
    pub users_name: Option<String>,

    /// Personalization: not yet available
    #[validate(length(max = 100, message = "Date is too long"))]
    pub date_taken: Option<String>,
}

/// Non-option fields of [`NotesForm`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotesFields {
    #[serde(default)]
    text: String,
    users_name: Option<String>,
    date_taken: Option<String>,
}

impl NotesForm {
    /// Read a form from a JSON body.
    ///
    /// A malformed body or a badly typed text field is a parse failure. Only
    /// a bad option value (unknown choice, non-boolean toggle) is reported as
    /// invalid options.
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        if !body.is_object() {
            return Err(AppError::JsonParseFailed(
                "Request body must be a JSON object".to_string(),
            ));
        }

        let fields = NotesFields::deserialize(body)
            .map_err(|e| AppError::JsonParseFailed(e.to_string()))?;
        let settings =
            NoteSettings::deserialize(body).map_err(|e| AppError::InvalidOptions(e.to_string()))?;

        Ok(Self {
            text: fields.text,
            settings,
            users_name: fields.users_name,
            date_taken: fields.date_taken,
        })
    }
}

/// What the client should render for a session
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,

    /// login, home, input, generate, output or error
    #[schema(value_type = String, example = "input")]
    pub screen: Screen,

    /// Snapshot of the last accepted Input form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<NotesOptions>,

    /// Present only on the output screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_notes: Option<String>,

    /// Present only on the error screen
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Invalid screen state: generate")]
    pub diagnostic: Option<String>,
}
