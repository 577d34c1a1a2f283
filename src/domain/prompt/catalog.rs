//! Option catalogue for rendering the Input screen.

use serde::Serialize;
use utoipa::ToSchema;

use super::dto::{NoteFormat, NoteSettings, NotesStyle, NotesType, MAX_NOTES_CHARS, MIN_NOTES_CHARS};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    /// Wire value, e.g. `BULLET_POINTS`
    #[schema(value_type = String)]
    pub value: serde_json::Value,
    pub label: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceField {
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
    pub choices: Vec<ChoiceOption>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleField {
    pub name: &'static str,
    pub label: &'static str,
    pub help: &'static str,
}

/// Everything a client needs to draw the Input form.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionCatalog {
    pub min_chars: usize,
    pub max_chars: usize,
    pub formatting: Vec<ChoiceField>,
    pub toggles: Vec<ToggleField>,
    pub defaults: NoteSettings,
}

fn choices<T: Serialize + Copy>(values: &[T], label: fn(T) -> &'static str) -> Vec<ChoiceOption> {
    values
        .iter()
        .map(|&value| ChoiceOption {
            value: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            label: label(value),
        })
        .collect()
}

pub fn option_catalog() -> OptionCatalog {
    OptionCatalog {
        min_chars: MIN_NOTES_CHARS,
        max_chars: MAX_NOTES_CHARS,
        formatting: vec![
            ChoiceField {
                name: "notesType",
                label: "Type",
                help: "Choose the type of your notes. Bullet Points is recommended for most users.",
                choices: choices(&NotesType::ALL, NotesType::label),
            },
            ChoiceField {
                name: "notesStyle",
                label: "Style",
                help: "Choose the style of your notes. Understandable is recommended for most users, however, Formal is also available for a more professional look.",
                choices: choices(&NotesStyle::ALL, NotesStyle::label),
            },
            ChoiceField {
                name: "format",
                label: "Styling",
                help: "Choose how you want your notes to be formatted. Markdown is recommended for most users.",
                choices: choices(&NoteFormat::ALL, NoteFormat::label),
            },
        ],
        toggles: vec![
            ToggleField {
                name: "useEmoji",
                label: "Use Emojis",
                help: "Automatically add emojis to your notes to make them more engaging.",
            },
            ToggleField {
                name: "fixContent",
                label: "Correct Factual Errors",
                help: "Automatically correct factual errors in your notes.",
            },
            ToggleField {
                name: "addExamples",
                label: "Add Examples",
                help: "Automatically add examples to your notes to make them more engaging.",
            },
            ToggleField {
                name: "removeDuplicates",
                label: "Remove Duplicates",
                help: "Automatically remove duplicate content in your notes.",
            },
            ToggleField {
                name: "removeIrrelevant",
                label: "Remove Irrelevant Content",
                help: "Automatically remove irrelevant content in your notes.",
            },
        ],
        defaults: NoteSettings::default(),
    }
}
