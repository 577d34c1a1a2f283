pub mod client;

pub use client::{NotesGenerator, OpenAiClient, SharedGenerator};
