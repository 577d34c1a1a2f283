pub mod ai;
pub mod health;
pub mod prompt;
pub mod session;
