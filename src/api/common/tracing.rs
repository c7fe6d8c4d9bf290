//! Callbacks for `tower_http::trace::TraceLayer`.
//!
//! Every request gets an `http_request` span; requests and responses are
//! logged with sensitive headers redacted and a level chosen by status class.

use axum::http::{HeaderMap, Request, Response};
use std::collections::HashMap;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tracing::{info_span, Level, Span};

const REDACTED_HEADER_MARKERS: [&str; 3] = ["authorization", "cookie", "token"];

pub fn make_custom_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri().path(),
        query = ?request.uri().query(),
        version = ?request.version(),
        request_id = request_id,
        user_agent = ?request.headers().get("user-agent"),
        content_type = ?request.headers().get("content-type"),
    )
}

pub fn on_custom_request<B>(request: &Request<B>, _span: &Span) {
    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        headers = ?redacted_headers(request.headers()),
        "Incoming HTTP request"
    );
}

pub fn on_custom_response<B>(response: &Response<B>, latency: Duration, _span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis();

    match status_level(status.as_u16()) {
        Level::ERROR => tracing::error!(
            status = %status,
            latency_ms = latency_ms,
            "HTTP request completed with server error"
        ),
        Level::WARN => tracing::warn!(
            status = %status,
            latency_ms = latency_ms,
            "HTTP request completed with client error"
        ),
        _ => tracing::info!(
            status = %status,
            latency_ms = latency_ms,
            "HTTP request completed successfully"
        ),
    }
}

pub fn on_custom_failure(error: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    let error_type = match &error {
        ServerErrorsFailureClass::StatusCode(code) => format!("HTTP {}", code.as_u16()),
        ServerErrorsFailureClass::Error(_) => "Internal Error".to_string(),
    };

    tracing::error!(
        error = ?error,
        latency_ms = latency.as_millis(),
        error_type = error_type,
        "HTTP request failed"
    );
}

fn status_level(status: u16) -> Level {
    match status {
        400..=499 => Level::WARN,
        500..=599 => Level::ERROR,
        _ => Level::INFO,
    }
}

fn redacted_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let lowered = name.as_str().to_lowercase();
            if REDACTED_HEADER_MARKERS.iter().any(|m| lowered.contains(m)) {
                Some((name.to_string(), "[REDACTED]".to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect()
}
