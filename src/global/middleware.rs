//! Request tracing and HTTP metrics.

use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps each request in a span carrying a request id.
///
/// A client-supplied `x-request-id` is reused, otherwise a fresh UUID is
/// generated. The id is echoed back on the response.
pub async fn request_tracing(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        tracing::info!("Request started");
        let start = Instant::now();

        let mut response = next.run(request).await;

        let duration = start.elapsed();
        let status = response.status().as_u16();
        tracing::info!(status, duration_ms = duration.as_millis() as u64, "Request completed");

        record_request_metrics(method.as_str(), &path, status, duration);

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

fn record_request_metrics(method: &str, path: &str, status: u16, duration: Duration) {
    let route = normalize_path(path);
    let status = status.to_string();

    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => route.clone(),
        "status" => status.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => route,
        "status" => status
    )
    .record(duration.as_secs_f64());
}

/// Replace session ids in a path with `:id` so metric labels stay bounded.
fn normalize_path(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }
    path.split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
