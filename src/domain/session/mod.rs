pub mod dto;
pub mod handler;
pub mod service;
pub mod state;
pub mod store;

pub use dto::{LoginRequest, NotesForm, SessionView};
pub use service::SessionService;
pub use state::{Screen, SessionState};
