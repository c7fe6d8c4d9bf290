use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::common::require_param;
use crate::db::models::{CommentRecord, WatchVideo};
use crate::errors::{AppError, ErrorBody};
use crate::InnerState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WatchParams {
    /// The video ID.
    pub v: Option<String>,
    /// The viewer whose subscription to the video's channel is reported.
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommentBody {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment keyed by its author's username: `{"alice": {"content": ...}}`.
pub type CommentEntry = HashMap<String, CommentBody>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WatchDetail {
    #[serde(flatten)]
    pub video: WatchVideo,
    #[schema(value_type = Vec<HashMap<String, CommentBody>>)]
    pub comments: Vec<CommentEntry>,
}

/// Shapes comment rows into single-key objects, preserving their order.
pub fn comment_thread(records: Vec<CommentRecord>) -> Vec<CommentEntry> {
    records
        .into_iter()
        .map(|record| {
            HashMap::from([(
                record.username,
                CommentBody {
                    content: record.comment_text,
                    created_at: record.comment_created_at,
                },
            )])
        })
        .collect()
}

/// Video detail and comment thread, wrapped in a one-element array.
#[utoipa::path(
    get,
    path = "/watch",
    tag = "Videos",
    summary = "Retrieve details of a specific video",
    params(WatchParams),
    responses(
        (status = 200, description = "A one-element JSON array with the video details", body = Vec<WatchDetail>),
        (status = 400, description = "v is missing", body = ErrorBody),
        (status = 404, description = "No such video", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "Watch video", skip(inner))]
pub async fn watch_video(
    State(inner): State<InnerState>,
    Query(params): Query<WatchParams>,
) -> Result<Json<Vec<WatchDetail>>, AppError> {
    let video_id = require_param(params.v, "v")?;
    let viewer_id = params
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let video = inner
        .repo
        .find_watch_video(&video_id, viewer_id.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video '{}' not found", video_id)))?;

    let comments = inner.repo.comments_for_video(&video.video_id).await?;
    tracing::info!("Video {} has {} comments", video.video_id, comments.len());

    Ok(Json(vec![WatchDetail {
        video,
        comments: comment_thread(comments),
    }]))
}
