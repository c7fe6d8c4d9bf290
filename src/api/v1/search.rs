use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::db::models::SearchResult;
use crate::errors::{AppError, ErrorBody};
use crate::InnerState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Matched case-insensitively against video titles and channel names.
    /// Absent or empty matches every video.
    pub search_query: Option<String>,
}

#[utoipa::path(
    get,
    path = "/result",
    tag = "Videos",
    summary = "Search for videos by title or channel name",
    params(SearchParams),
    responses(
        (status = 200, description = "A JSON array of matching videos", body = Vec<SearchResult>),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "Search videos", skip(inner))]
pub async fn search_videos(
    State(inner): State<InnerState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let query = params.search_query.unwrap_or_default();
    if query.is_empty() {
        tracing::debug!("Empty search query, matching every video");
    }

    let results = inner.repo.search_videos(&query).await?;
    tracing::info!("Search {:?} matched {} videos", query, results.len());
    Ok(Json(results))
}
