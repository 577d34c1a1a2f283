use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Minimum note length accepted by the Input screen (characters).
pub const MIN_NOTES_CHARS: usize = 100;
/// Maximum note length accepted by the Input screen (characters).
pub const MAX_NOTES_CHARS: usize = 10_000;

/// Overall shape of the rewritten notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotesType {
    #[default]
    BulletPoints,
    Paragraphs,
    PreserveOriginal,
}

impl NotesType {
    pub const ALL: [NotesType; 3] = [
        NotesType::BulletPoints,
        NotesType::Paragraphs,
        NotesType::PreserveOriginal,
    ];

    /// Display label, also the fragment key in the prompt template.
    pub fn label(self) -> &'static str {
        match self {
            NotesType::BulletPoints => "Bullet Points",
            NotesType::Paragraphs => "Paragraphs",
            NotesType::PreserveOriginal => "Preserve Original Type",
        }
    }
}

/// Register of the rewritten notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotesStyle {
    #[default]
    Understandable,
    Formal,
}

impl NotesStyle {
    pub const ALL: [NotesStyle; 2] = [NotesStyle::Understandable, NotesStyle::Formal];

    pub fn label(self) -> &'static str {
        match self {
            NotesStyle::Understandable => "Understandable",
            NotesStyle::Formal => "Formal",
        }
    }
}

/// Output markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteFormat {
    #[default]
    Markdown,
    PlainText,
}

impl NoteFormat {
    pub const ALL: [NoteFormat; 2] = [NoteFormat::Markdown, NoteFormat::PlainText];

    pub fn label(self) -> &'static str {
        match self {
            NoteFormat::Markdown => "Markdown",
            NoteFormat::PlainText => "Plain Text",
        }
    }
}

/// Formatting and content choices from the Input screen.
///
/// Defaults match the initial state of the form: bullet points, understandable
/// style, Markdown, and every content toggle switched on. Fields left out of a
/// submitted form take these defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteSettings {
    pub notes_type: NotesType,
    pub notes_style: NotesStyle,
    pub format: NoteFormat,
    pub use_emoji: bool,
    pub fix_content: bool,
    pub add_examples: bool,
    pub remove_duplicates: bool,
    pub remove_irrelevant: bool,
}

impl Default for NoteSettings {
    fn default() -> Self {
        Self {
            notes_type: NotesType::default(),
            notes_style: NotesStyle::default(),
            format: NoteFormat::default(),
            use_emoji: true,
            fix_content: true,
            add_examples: true,
            remove_duplicates: true,
            remove_irrelevant: true,
        }
    }
}

/// Validated snapshot of a submitted Input form.
///
/// Construction checks the note length, so a `NotesOptions` value always
/// holds between [`MIN_NOTES_CHARS`] and [`MAX_NOTES_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotesOptions {
    #[serde(flatten)]
    settings: NoteSettings,
    raw_text: String,
}

impl NotesOptions {
    pub fn new(settings: NoteSettings, raw_text: impl Into<String>) -> Result<Self, AppError> {
        let raw_text = raw_text.into();
        validate_notes_length(&raw_text)?;
        Ok(Self { settings, raw_text })
    }

    pub fn settings(&self) -> &NoteSettings {
        &self.settings
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}

/// Length gate for note text, counted in characters rather than bytes.
pub fn validate_notes_length(raw_text: &str) -> Result<(), AppError> {
    let actual = raw_text.chars().count();
    if actual == 0 {
        return Err(AppError::EmptyNotes);
    }
    if actual < MIN_NOTES_CHARS {
        return Err(AppError::NotesTooShort {
            min: MIN_NOTES_CHARS,
            actual,
        });
    }
    if actual > MAX_NOTES_CHARS {
        return Err(AppError::NotesTooLong {
            max: MAX_NOTES_CHARS,
            actual,
        });
    }
    Ok(())
}
