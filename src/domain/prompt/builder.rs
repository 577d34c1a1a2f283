//! System prompt assembly.
//!
//! The system prompt is the base instructions followed by one fragment per
//! option category, in [`OptionCategory::ALL`] order, then the two closing
//! instructions. The note text itself is passed through untouched as the user
//! message.

use super::dto::NotesOptions;
use super::template::{bool_key, OptionCategory, PromptTemplate};
use crate::error::AppError;

/// Appended after every option fragment: separator plus TL;DR.
pub const SUMMARY_INSTRUCTION: &str = "After rewriting the notes, please add a horizontal line and provide a summary of the notes in a few sentences (like a TLDR).";

/// Appended last: keeps the model's own voice out of the notes.
pub const NO_META_COMMENTARY_INSTRUCTION: &str = "Please do not add any AI-generated thoughts or comments to the notes. Avoid sentences like: 'By looking at this process we can appreciate the complexity of the system.' or 'I hope this helps.' Give the notes, the summary, and that's it.";

/// Prompt pair handed to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_message: String,
}

/// Template lookups for `options`, in assembly order.
pub fn fragment_keys(options: &NotesOptions) -> [(OptionCategory, &'static str); 8] {
    let settings = options.settings();
    [
        (OptionCategory::NotesType, settings.notes_type.label()),
        (OptionCategory::NotesStyle, settings.notes_style.label()),
        (OptionCategory::Format, settings.format.label()),
        (OptionCategory::UseEmoji, bool_key(settings.use_emoji)),
        (OptionCategory::FixContent, bool_key(settings.fix_content)),
        (OptionCategory::AddExamples, bool_key(settings.add_examples)),
        (
            OptionCategory::RemoveDuplicates,
            bool_key(settings.remove_duplicates),
        ),
        (
            OptionCategory::RemoveIrrelevant,
            bool_key(settings.remove_irrelevant),
        ),
    ]
}

/// Assemble the prompt pair for `options`.
///
/// Fails with [`AppError::TemplateMissingFragment`] on the first lookup the
/// template cannot satisfy; nothing is omitted silently.
pub fn build_prompt(options: &NotesOptions, template: &PromptTemplate) -> Result<PromptPair, AppError> {
    let mut parts: Vec<&str> = Vec::with_capacity(11);
    parts.push(template.system_instructions());

    for (category, key) in fragment_keys(options) {
        parts.push(template.fragment(category, key)?);
    }

    parts.push(SUMMARY_INSTRUCTION);
    parts.push(NO_META_COMMENTARY_INSTRUCTION);

    let joined = parts
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let system_prompt = normalize_period_spacing(&joined);

    tracing::debug!(
        system_prompt_length = system_prompt.len(),
        user_message_length = options.raw_text().len(),
        "Prompt assembled"
    );

    Ok(PromptPair {
        system_prompt,
        user_message: options.raw_text().to_string(),
    })
}

/// Make every period that is followed by more text on the same line be
/// followed by exactly one space.
///
/// Missing spaces are inserted and runs of spaces collapse to one. A period
/// at the end of the string, or directly before a line break or tab, is left
/// alone. Idempotent.
pub fn normalize_period_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '.' {
            continue;
        }

        let mut skipped_space = false;
        while chars.peek() == Some(&' ') {
            chars.next();
            skipped_space = true;
        }

        match chars.peek() {
            None => {}
            Some(next) if next.is_whitespace() => {
                if skipped_space {
                    out.push(' ');
                }
            }
            Some(_) => out.push(' '),
        }
    }

    out
}
