pub mod builder;
pub mod catalog;
pub mod dto;
pub mod handler;
pub mod template;

pub use builder::{build_prompt, normalize_period_spacing, PromptPair};
pub use dto::{NoteFormat, NoteSettings, NotesOptions, NotesStyle, NotesType};
pub use template::PromptTemplate;
