//! Per-session screen state machine.
//!
//! ```text
//! Login --(secret ok)--> Input --(valid notes)--> Generate --(ok)--> Output
//!                                                     \--(failure)--> Error
//! ```
//!
//! `Home` exists but cannot be entered yet. `Error` also absorbs any screen
//! value that is not one of the known screens.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dto::{NotesForm, SessionView};
use crate::domain::ai::NotesGenerator;
use crate::domain::prompt::{build_prompt, NotesOptions, PromptTemplate};
use crate::error::AppError;
use crate::global::validator::SecretKeyValidator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Screen {
    Login,
    /// Landing page; not implemented, login goes straight to `Input`.
    Home,
    Input,
    Generate,
    Output,
    /// Holds the raw screen value that could not be handled.
    Error(String),
}

impl Screen {
    /// Interpret a raw screen value; anything unrecognized becomes `Error`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "login" => Screen::Login,
            "home" => Screen::Home,
            "input" => Screen::Input,
            "generate" => Screen::Generate,
            "output" => Screen::Output,
            other => Screen::Error(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Home => "home",
            Screen::Input => "input",
            Screen::Generate => "generate",
            Screen::Output => "output",
            Screen::Error(_) => "error",
        }
    }
}

impl From<String> for Screen {
    fn from(raw: String) -> Self {
        Screen::parse(&raw)
    }
}

impl From<Screen> for String {
    fn from(screen: Screen) -> Self {
        screen.as_str().to_string()
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's session. Options and generated notes are overwritten on each
/// cycle; nothing older is kept.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    screen: Screen,
    options: Option<NotesOptions>,
    generated_notes: Option<String>,
    failure: Option<String>,
    last_active: Instant,
}

impl SessionState {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            screen: Screen::Login,
            options: None,
            generated_notes: None,
            failure: None,
            last_active: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn options(&self) -> Option<&NotesOptions> {
        self.options.as_ref()
    }

    pub fn generated_notes(&self) -> Option<&str> {
        self.generated_notes.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Mark the session as used just now.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    /// Reconcile with the screen the client says it is showing.
    ///
    /// A value that is not a known screen moves the session to `Error`
    /// holding that value. A known screen never overrides the server's own.
    pub fn sync_client_screen(&mut self, raw_screen: &str) {
        match Screen::parse(raw_screen) {
            Screen::Error(raw) => {
                tracing::warn!(session_id = %self.id, screen = %raw, "Unknown screen state");
                self.screen = Screen::Error(raw);
            }
            reported if reported != self.screen => {
                tracing::debug!(
                    session_id = %self.id,
                    reported = %reported,
                    current = %self.screen,
                    "Client screen out of date"
                );
            }
            _ => {}
        }
    }

    fn require(&self, expected: Screen, action: &'static str) -> Result<(), AppError> {
        match &self.screen {
            current if *current == expected => Ok(()),
            Screen::Error(raw) if raw != Screen::Generate.as_str() => {
                Err(AppError::UnknownState(raw.clone()))
            }
            current => Err(AppError::InvalidTransition {
                screen: current.to_string(),
                action,
            }),
        }
    }

    /// Login → Input when the credential matches; otherwise stay on Login.
    pub fn submit_credentials(
        &mut self,
        credential: &str,
        validator: &SecretKeyValidator,
    ) -> Result<(), AppError> {
        self.require(Screen::Login, "login")?;

        if credential.is_empty() {
            return Err(AppError::EmptyCredential);
        }
        validator.validate(credential)?;

        // Home is skipped until it exists.
        self.screen = Screen::Input;
        tracing::info!(session_id = %self.id, "Login successful");
        Ok(())
    }

    /// Home has no implementation; the gap is reported rather than hidden.
    pub fn enter_home(&mut self) -> Result<(), AppError> {
        Err(AppError::NotImplemented("The home screen"))
    }

    /// Input → Generate with a snapshot of the submitted form.
    ///
    /// Empty or too-short notes keep the session on Input.
    pub fn submit_notes(&mut self, form: &NotesForm) -> Result<(), AppError> {
        self.require(Screen::Input, "submit notes")?;

        if form.users_name.is_some() || form.date_taken.is_some() {
            return Err(AppError::NotImplemented("Personalization"));
        }

        let options = NotesOptions::new(form.settings, form.text.as_str())?;

        tracing::info!(
            session_id = %self.id,
            notes_chars = options.raw_text().chars().count(),
            notes_type = ?options.settings().notes_type,
            "Notes accepted, starting generation"
        );

        self.options = Some(options);
        self.generated_notes = None;
        self.failure = None;
        self.screen = Screen::Generate;
        Ok(())
    }

    /// Run the Generate screen: build the prompt, call the generator, and
    /// land on Output or Error. Waits at most `timeout` for the generator.
    pub async fn generate(
        &mut self,
        template: &PromptTemplate,
        generator: &dyn NotesGenerator,
        timeout: Duration,
    ) -> Result<(), AppError> {
        self.require(Screen::Generate, "generate")?;
        let options = self
            .options
            .as_ref()
            .ok_or_else(|| AppError::Internal("Generate entered without options".to_string()))?;

        let outcome = match build_prompt(options, template) {
            Ok(prompt) => match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::GenerationTimeout(timeout.as_secs())),
            },
            Err(e) => Err(e),
        };

        self.complete_generation(outcome);
        Ok(())
    }

    fn complete_generation(&mut self, outcome: Result<String, AppError>) {
        match outcome {
            Ok(notes) => {
                tracing::info!(
                    session_id = %self.id,
                    notes_length = notes.len(),
                    "Notes generated"
                );
                self.generated_notes = Some(notes);
                self.screen = Screen::Output;
            }
            Err(e) => {
                tracing::error!(
                    session_id = %self.id,
                    code = e.error_code(),
                    error = %e,
                    "Generation failed"
                );
                self.failure = Some(e.to_string());
                self.screen = Screen::Error(Screen::Generate.as_str().to_string());
            }
        }
    }

    /// Diagnostic text for the Error screen.
    pub fn diagnostic(&self) -> Option<String> {
        let Screen::Error(raw) = &self.screen else {
            return None;
        };
        let base = format!("Invalid screen state: {}", raw);
        Some(match &self.failure {
            Some(detail) => format!("{} ({})", base, detail),
            None => base,
        })
    }

    pub fn view(&self) -> SessionView {
        // Only finished results are shown; Error never carries partial output.
        let generated_notes = match self.screen {
            Screen::Output => self.generated_notes.clone(),
            _ => None,
        };

        SessionView {
            session_id: self.id,
            screen: self.screen.clone(),
            options: self.options.clone(),
            generated_notes,
            diagnostic: self.diagnostic(),
        }
    }
}
