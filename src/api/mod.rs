//! HTTP surface of the service
//!
//! Assembles the versioned routes, the system routes and the generated API
//! documentation into one router with the shared middleware stack.

pub mod common;
pub mod v1;

use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::common::tracing::{
    make_custom_span, on_custom_failure, on_custom_request, on_custom_response,
};
use crate::system;
use crate::InnerState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Video Sharing API",
        version = "0.1.0",
        description = "Read/write API for videos, channels, subscriptions and users"
    ),
    paths(
        v1::videos::all_videos,
        v1::videos::short_videos,
        v1::search::search_videos,
        v1::watch::watch_video,
        v1::subscriptions::user_subscriptions,
        v1::user::register_user,
        v1::user::all_users,
        system::health_check::health_check,
    ),
    tags(
        (name = "Videos", description = "Video listings, search and watch details"),
        (name = "Subscriptions", description = "Channel subscriptions of a user"),
        (name = "Users", description = "Registration and user listing"),
        (name = "System", description = "Operational endpoints"),
    ),
)]
pub struct ApiDoc;

/// Builds the application router. Swagger UI is served at `/api-docs` and
/// the request metrics recorded by `prometheus_layer` at `/metrics`.
#[tracing::instrument(name = "create_api_router", skip(state, prometheus_layer, metric_handle))]
pub fn create_api_router(
    state: InnerState,
    request_timeout: Duration,
    prometheus_layer: PrometheusMetricLayer<'static>,
    metric_handle: PrometheusHandle,
) -> Router {
    tracing::info!("Creating API router");

    Router::new()
        .merge(v1::routes::create_v1_routes())
        .merge(system::create_system_router())
        .with_state(state)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_custom_span::<Body>)
                .on_request(on_custom_request::<Body>)
                .on_response(on_custom_response::<Body>)
                .on_failure(on_custom_failure),
        )
}
