use axum::extract::State;
use axum::Json;

use crate::db::models::{ShortVideo, VideoListing};
use crate::errors::{AppError, ErrorBody};
use crate::InnerState;

/// Every video with its channel and view count. Unpaginated.
#[utoipa::path(
    get,
    path = "/",
    tag = "Videos",
    summary = "Retrieve a list of videos",
    responses(
        (status = 200, description = "A JSON array of videos", body = Vec<VideoListing>),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "List all videos", skip(inner))]
pub async fn all_videos(
    State(inner): State<InnerState>,
) -> Result<Json<Vec<VideoListing>>, AppError> {
    let videos = inner.repo.list_videos().await?;
    tracing::info!("Returning {} videos", videos.len());
    Ok(Json(videos))
}

#[utoipa::path(
    get,
    path = "/short",
    tag = "Videos",
    summary = "Retrieve a list of short videos",
    responses(
        (status = 200, description = "A JSON array of short videos", body = Vec<ShortVideo>),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "List short videos", skip(inner))]
pub async fn short_videos(
    State(inner): State<InnerState>,
) -> Result<Json<Vec<ShortVideo>>, AppError> {
    let shorts = inner.repo.list_shorts().await?;
    tracing::info!("Returning {} short videos", shorts.len());
    Ok(Json(shorts))
}
