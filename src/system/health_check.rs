use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Liveness probe",
    responses((status = 200, description = "Service is up", body = String)),
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
