use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::dto::{NotesForm, SessionView};
use super::state::Screen;
use super::store::SessionStore;
use crate::config::AppConfig;
use crate::domain::ai::SharedGenerator;
use crate::domain::prompt::PromptTemplate;
use crate::error::AppError;
use crate::global::validator::SecretKeyValidator;
use crate::rate_limiter::RateLimiter;

/// Drives sessions through the screen flow.
///
/// Every call takes the session's own lock for the whole transition, so a
/// session handles one transition at a time while other sessions proceed.
#[derive(Clone)]
pub struct SessionService {
    store: SessionStore,
    template: Arc<PromptTemplate>,
    generator: SharedGenerator,
    credentials: SecretKeyValidator,
    login_limiter: RateLimiter,
    generation_timeout: Duration,
    idle_timeout: Duration,
}

impl SessionService {
    pub fn new(config: &AppConfig, template: Arc<PromptTemplate>, generator: SharedGenerator) -> Self {
        Self {
            store: SessionStore::new(),
            template,
            generator,
            credentials: SecretKeyValidator::new(config.app_password.clone()),
            login_limiter: RateLimiter::new(config.login_max_attempts, config.login_window_secs),
            generation_timeout: config.generation_timeout,
            idle_timeout: config.session_idle_timeout,
        }
    }

    pub async fn start_session(&self) -> SessionView {
        let (id, handle) = self.store.create().await;
        metrics::gauge!("sessions_active").increment(1.0);
        tracing::info!(session_id = %id, "Session started");

        let session = handle.lock().await;
        session.view()
    }

    /// Current view, optionally reconciled with the screen the client shows.
    pub async fn view(&self, id: Uuid, client_screen: Option<&str>) -> Result<SessionView, AppError> {
        let handle = self.store.get(id).await?;
        let mut session = handle.lock().await;
        session.touch();
        if let Some(raw) = client_screen {
            session.sync_client_screen(raw);
        }
        Ok(session.view())
    }

    pub async fn end_session(&self, id: Uuid) -> Result<(), AppError> {
        self.store.remove(id).await?;
        metrics::gauge!("sessions_active").decrement(1.0);
        tracing::info!(session_id = %id, "Session ended");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.store.count().await
    }

    /// Drop sessions idle past the configured timeout, along with login
    /// counters whose window has run out.
    pub async fn evict_idle_sessions(&self) -> usize {
        let evicted = self.store.evict_idle(self.idle_timeout).await;
        let purged = self.login_limiter.purge_expired();

        if !evicted.is_empty() {
            metrics::gauge!("sessions_active").decrement(evicted.len() as f64);
            tracing::info!(
                evicted = evicted.len(),
                purged_login_keys = purged,
                "Idle sessions evicted"
            );
        }
        evicted.len()
    }

    /// Run [`Self::evict_idle_sessions`] every `every` until the runtime stops.
    pub fn spawn_idle_sweeper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                service.evict_idle_sessions().await;
            }
        })
    }

    /// Login screen submission.
    ///
    /// Wrong passwords are counted per client address, so opening fresh
    /// sessions does not reset the throttle.
    pub async fn login(&self, id: Uuid, client: &str, password: &str) -> Result<SessionView, AppError> {
        let handle = self.store.get(id).await?;
        let mut session = handle.lock().await;
        session.touch();

        self.login_limiter.check_rate_limit(client)?;

        match session.submit_credentials(password, &self.credentials) {
            Ok(()) => {
                self.login_limiter.reset(client);
                Ok(session.view())
            }
            Err(AppError::InvalidCredential) => {
                self.login_limiter.record_failure(client);
                tracing::warn!(session_id = %id, client, "Wrong password");
                Err(AppError::InvalidCredential)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn enter_home(&self, id: Uuid) -> Result<SessionView, AppError> {
        let handle = self.store.get(id).await?;
        let mut session = handle.lock().await;
        session.touch();
        session.enter_home()?;
        Ok(session.view())
    }

    /// Input screen submission.
    ///
    /// Accepted notes move the session to Generate, and generation runs to
    /// completion before the resulting Output or Error view is returned.
    /// Rejected input leaves the session on Input and returns the error.
    pub async fn submit_notes(&self, id: Uuid, form: &NotesForm) -> Result<SessionView, AppError> {
        let handle = self.store.get(id).await?;
        let mut session = handle.lock_owned().await;
        session.touch();

        session.submit_notes(form)?;

        let template = Arc::clone(&self.template);
        let generator = Arc::clone(&self.generator);
        let timeout = self.generation_timeout;

        // Detached so a dropped request cannot abandon a session mid-Generate.
        let generation = tokio::spawn(async move {
            let started = Instant::now();
            session.generate(&template, generator.as_ref(), timeout).await?;
            session.touch();

            let outcome = match session.screen() {
                Screen::Output => "success",
                _ => "failure",
            };
            metrics::counter!("notes_generations_total", "outcome" => outcome).increment(1);
            metrics::histogram!("notes_generation_duration_seconds")
                .record(started.elapsed().as_secs_f64());

            Ok::<_, AppError>(session.view())
        });

        generation
            .await
            .map_err(|e| AppError::Internal(format!("Generation task failed: {}", e)))?
    }
}
