use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default bounded wait on the text-generation service.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Longest accepted generation timeout (one hour).
pub const MAX_GENERATION_TIMEOUT_SECS: u64 = 3600;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Application configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,

    /// Shared login secret
    pub app_password: String,

    // Text generation
    pub openai_api_key: String,
    pub openai_model: String,
    pub generation_timeout: Duration,

    pub prompt_template_path: PathBuf,

    // Per-client login throttle
    pub login_max_attempts: u32,
    pub login_window_secs: u64,

    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let app_password = env::var("APP_PASSWORD")
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingAppPassword)?;

        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
            tracing::warn!(
                "OPENAI_API_KEY is not set. Generation requests will fail until it is configured."
            );
            "test-key".to_string()
        });

        let openai_model = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let timeout_secs: u64 = parse_or_default(
            "GENERATION_TIMEOUT_SECS",
            DEFAULT_GENERATION_TIMEOUT_SECS,
        )
        .map_err(|_| ConfigError::InvalidTimeout)?;
        if timeout_secs == 0 || timeout_secs > MAX_GENERATION_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout);
        }

        let prompt_template_path = env::var("PROMPT_TEMPLATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static/prompt/build_prompt.json"));

        let login_max_attempts =
            parse_or_default("LOGIN_MAX_ATTEMPTS", 5).map_err(|_| ConfigError::InvalidLoginLimit)?;
        let login_window_secs =
            parse_or_default("LOGIN_WINDOW_SECS", 60).map_err(|_| ConfigError::InvalidLoginLimit)?;

        let session_idle_secs: u64 = parse_or_default("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)
            .map_err(|_| ConfigError::InvalidSessionIdle)?;
        if session_idle_secs == 0 {
            return Err(ConfigError::InvalidSessionIdle);
        }

        Ok(Self {
            server_host,
            server_port,
            app_password,
            openai_api_key,
            openai_model,
            generation_timeout: Duration::from_secs(timeout_secs),
            prompt_template_path,
            login_max_attempts,
            login_window_secs,
            session_idle_timeout: Duration::from_secs(session_idle_secs),
        })
    }

    /// Configuration used by tests and local tooling.
    pub fn for_tests(app_password: &str) -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            app_password: app_password.to_string(),
            openai_api_key: "test-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            prompt_template_path: PathBuf::from("static/prompt/build_prompt.json"),
            login_max_attempts: 5,
            login_window_secs: 60,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, T::Err> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse(),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("GENERATION_TIMEOUT_SECS must be between 1 and 3600 seconds")]
    InvalidTimeout,
    #[error("LOGIN_MAX_ATTEMPTS and LOGIN_WINDOW_SECS must be non-negative integers")]
    InvalidLoginLimit,
    #[error("SESSION_IDLE_SECS must be a positive number of seconds")]
    InvalidSessionIdle,
    #[error("APP_PASSWORD environment variable is required")]
    MissingAppPassword,
}
