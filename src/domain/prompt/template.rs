//! Prompt template document.
//!
//! The template maps every option category to a table of fragments keyed by
//! the option's value, plus the base `system_instructions` text:
//!
//! ```json
//! {
//!   "system_instructions": "...",
//!   "notes_type": { "Bullet Points": "...", "Paragraphs": "...", ... },
//!   "use_emojis": { "true": "...", "false": "..." },
//!   ...
//! }
//! ```
//!
//! It is loaded once at start-up and shared read-only by every session.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::dto::{NoteFormat, NotesStyle, NotesType};
use crate::error::AppError;

/// Template document bundled with the crate.
const BUNDLED_TEMPLATE: &str = include_str!("../../../static/prompt/build_prompt.json");

/// Option categories in prompt assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCategory {
    NotesType,
    NotesStyle,
    Format,
    UseEmoji,
    FixContent,
    AddExamples,
    RemoveDuplicates,
    RemoveIrrelevant,
}

impl OptionCategory {
    pub const ALL: [OptionCategory; 8] = [
        OptionCategory::NotesType,
        OptionCategory::NotesStyle,
        OptionCategory::Format,
        OptionCategory::UseEmoji,
        OptionCategory::FixContent,
        OptionCategory::AddExamples,
        OptionCategory::RemoveDuplicates,
        OptionCategory::RemoveIrrelevant,
    ];

    /// Top-level key of this category in the template document.
    pub fn key(self) -> &'static str {
        match self {
            OptionCategory::NotesType => "notes_type",
            OptionCategory::NotesStyle => "notes_style",
            OptionCategory::Format => "format_notes",
            OptionCategory::UseEmoji => "use_emojis",
            OptionCategory::FixContent => "fix_content",
            OptionCategory::AddExamples => "add_examples",
            OptionCategory::RemoveDuplicates => "remove_duplicates",
            OptionCategory::RemoveIrrelevant => "remove_irrelevant",
        }
    }

    /// Every value key a complete template must define for this category.
    pub fn value_keys(self) -> Vec<&'static str> {
        match self {
            OptionCategory::NotesType => NotesType::ALL.iter().map(|v| v.label()).collect(),
            OptionCategory::NotesStyle => NotesStyle::ALL.iter().map(|v| v.label()).collect(),
            OptionCategory::Format => NoteFormat::ALL.iter().map(|v| v.label()).collect(),
            _ => vec![bool_key(true), bool_key(false)],
        }
    }
}

/// Fragment key for a boolean option.
pub fn bool_key(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    system_instructions: String,
    #[serde(flatten)]
    fragments: HashMap<String, HashMap<String, String>>,
}

impl PromptTemplate {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::TemplateLoad(e.to_string()))
    }

    /// Read and parse the template document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::TemplateLoad(format!("{}: {}", path.display(), e)))?;
        let template = Self::from_json(&json)?;

        tracing::info!(
            path = %path.display(),
            categories = template.fragments.len(),
            "Prompt template loaded"
        );
        Ok(template)
    }

    /// The template shipped in `static/prompt/build_prompt.json`.
    pub fn bundled() -> Result<Self, AppError> {
        Self::from_json(BUNDLED_TEMPLATE)
    }

    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }

    /// Look up a fragment, failing if the category or value key is absent.
    pub fn fragment(&self, category: OptionCategory, key: &str) -> Result<&str, AppError> {
        self.fragments
            .get(category.key())
            .and_then(|values| values.get(key))
            .map(String::as_str)
            .ok_or_else(|| AppError::TemplateMissingFragment {
                category: category.key().to_string(),
                key: key.to_string(),
            })
    }

    /// `(category, key)` pairs the template does not define.
    pub fn missing_fragments(&self) -> Vec<(&'static str, &'static str)> {
        OptionCategory::ALL
            .iter()
            .flat_map(|&category| {
                category
                    .value_keys()
                    .into_iter()
                    .filter(move |key| self.fragment(category, key).is_err())
                    .map(move |key| (category.key(), key))
            })
            .collect()
    }
}
