//! Row shapes returned by the query layer.
//!
//! Rows are flat on purpose: each listing row repeats its channel and
//! popularity columns instead of nesting them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One row of the home listing: video, channel and popularity joined.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VideoListing {
    pub video_id: String,
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub channel_id: String,
    pub channel_name: String,
    pub channel_profile_picture_url: Option<String>,
    pub view_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ShortVideo {
    pub title: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
}

/// A channel a user subscribes to, together with the subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubscriptionRow {
    pub user_id: String,
    pub username: String,
    pub user_profile_picture_url: Option<String>,
    pub channel_id: String,
    pub channel_name: String,
    pub channel_profile_picture_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SearchResult {
    pub video_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub channel_name: String,
    pub channel_profile_picture_url: Option<String>,
    pub view_count: i64,
}

/// Everything the watch page shows about a video except its comments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WatchVideo {
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Length in seconds.
    pub duration: Option<i32>,
    pub thumbnail_url: Option<String>,
    pub video_url: String,
    pub created_at: DateTime<Utc>,
    pub channel_id: String,
    pub channel_name: String,
    pub channel_profile_picture_url: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CommentRecord {
    pub username: String,
    pub comment_text: String,
    pub comment_created_at: DateTime<Utc>,
}

/// A user about to be inserted. The password is already hashed.
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// User row safe to expose: no credential columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PublicUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
