//! Structured JSON logging to stdout and a daily-rolling file.

use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info,astro_notes=debug";

/// Install the global subscriber.
///
/// The level comes from `RUST_LOG` (default [`DEFAULT_LOG_FILTER`]). Files go
/// to `LOG_DIR` (default `logs`) as `astro-notes.log.YYYY-MM-DD`.
///
/// Keep the returned guard alive in `main`; dropping it flushes and stops the
/// file writer.
pub fn init_logging() -> WorkerGuard {
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

    let file_appender = rolling::daily(&log_dir, "astro-notes.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false);

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
    {
        // A subscriber set earlier (e.g. by a test harness) wins.
        eprintln!("Logging not initialized: {}", err);
    }

    guard
}
