use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use astro_notes::{
    config::AppConfig,
    create_router,
    domain::{health::service::init_start_time, prompt::PromptTemplate},
    shutdown::shutdown_signal,
    utils::init_logging,
    AppState, OpenAiClient,
};
use metrics_exporter_prometheus::PrometheusBuilder;

const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_logging();

    init_start_time();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let template = match PromptTemplate::load(&config.prompt_template_path) {
        Ok(template) => template,
        Err(e) => {
            tracing::error!(error = %e, "Prompt template could not be loaded");
            std::process::exit(1);
        }
    };
    for (category, key) in template.missing_fragments() {
        tracing::warn!(category, key, "Prompt template is missing a fragment");
    }

    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder not installed");
            None
        }
    };

    let generator = Arc::new(OpenAiClient::new(&config.openai_api_key, config.openai_model.as_str()));
    tracing::info!(
        model = %config.openai_model,
        timeout_secs = config.generation_timeout.as_secs(),
        "Text generation client ready"
    );

    let mut state = AppState::new(&config, Arc::new(template), generator);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }

    let sweep_every = config.session_idle_timeout.min(IDLE_SWEEP_INTERVAL);
    let _idle_sweeper = state.session_service.spawn_idle_sweeper(sweep_every);
    tracing::info!(
        idle_secs = config.session_idle_timeout.as_secs(),
        sweep_secs = sweep_every.as_secs(),
        "Idle session sweeper started"
    );

    let app = create_router(state);

    let addr: SocketAddr = match format!("{}:{}", config.server_host, config.server_port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, host = %config.server_host, "Invalid server address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "Server listening");
    tracing::info!("Swagger UI: http://{}/swagger-ui", addr);

    // Peer addresses key the login throttle when no proxy header is present.
    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
