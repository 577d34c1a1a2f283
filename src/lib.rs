pub mod config;
pub mod domain;
pub mod error;
pub mod global;
pub mod rate_limiter;
pub mod response;
pub mod shutdown;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::AppConfig;
use domain::prompt::PromptTemplate;
use domain::session::SessionService;

pub use domain::ai::{NotesGenerator, OpenAiClient, SharedGenerator};
pub use error::AppError;

/// Headroom on top of the generation timeout before a request is cut off.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub template: Arc<PromptTemplate>,
    pub metrics: Option<PrometheusHandle>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(config: &AppConfig, template: Arc<PromptTemplate>, generator: SharedGenerator) -> Self {
        Self {
            session_service: SessionService::new(config, Arc::clone(&template), generator),
            template,
            metrics: None,
            request_timeout: config.generation_timeout.saturating_add(REQUEST_TIMEOUT_MARGIN),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        domain::session::handler::create_session,
        domain::session::handler::get_session,
        domain::session::handler::delete_session,
        domain::session::handler::login,
        domain::session::handler::enter_home,
        domain::session::handler::submit_notes,
        domain::prompt::handler::get_options,
        domain::health::handler::health_check,
    ),
    components(
        schemas(
            domain::session::dto::LoginRequest,
            domain::session::dto::NotesForm,
            domain::session::dto::SessionView,
            domain::prompt::dto::NoteSettings,
            domain::prompt::dto::NotesOptions,
            domain::prompt::dto::NotesType,
            domain::prompt::dto::NotesStyle,
            domain::prompt::dto::NoteFormat,
            domain::prompt::catalog::OptionCatalog,
            domain::prompt::catalog::ChoiceField,
            domain::prompt::catalog::ChoiceOption,
            domain::prompt::catalog::ToggleField,
            domain::health::dto::HealthStatus,
            domain::health::dto::HealthState,
            domain::health::dto::HealthChecks,
            domain::health::dto::TemplateCheck,
            response::ErrorResponse,
            response::Severity,
        )
    ),
    tags(
        (name = "Session", description = "Login, notes submission and generation flow"),
        (name = "Notes", description = "Notes form options"),
        (name = "Health", description = "Server status")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(domain::health::handler::health_check))
        .route("/metrics", get(domain::health::handler::metrics))
        .route("/api/notes/options", get(domain::prompt::handler::get_options))
        .route("/api/sessions", post(domain::session::handler::create_session))
        .route(
            "/api/sessions/:session_id",
            get(domain::session::handler::get_session)
                .delete(domain::session::handler::delete_session),
        )
        .route(
            "/api/sessions/:session_id/login",
            post(domain::session::handler::login),
        )
        .route(
            "/api/sessions/:session_id/home",
            post(domain::session::handler::enter_home),
        )
        .route(
            "/api/sessions/:session_id/notes",
            post(domain::session::handler::submit_notes),
        )
        .layer(middleware::from_fn(global::request_tracing))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Router over the bundled template and the given generator.
pub fn create_test_router_with_mock(
    app_password: &str,
    generator: impl NotesGenerator + 'static,
) -> Router {
    create_test_router_with_config(AppConfig::for_tests(app_password), generator)
}

pub fn create_test_router_with_config(
    config: AppConfig,
    generator: impl NotesGenerator + 'static,
) -> Router {
    let template = match PromptTemplate::bundled() {
        Ok(template) => Arc::new(template),
        Err(e) => panic!("bundled prompt template is invalid: {}", e),
    };
    let state = AppState::new(&config, template, Arc::new(generator));
    create_router(state)
}
