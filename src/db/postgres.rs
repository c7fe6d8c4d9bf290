use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{
    CommentRecord, NewUser, PublicUser, SearchResult, ShortVideo, SubscriptionRow, VideoListing,
    WatchVideo,
};
use super::{like_pattern, timeout_query, VideoRepository};
use crate::errors::AppError;

/// Each query checks a connection out of the pool for its own duration; the
/// connection returns to the pool when the query future completes or drops.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl VideoRepository for PgRepository {
    #[tracing::instrument(name = "Fetch all videos", skip(self))]
    async fn list_videos(&self) -> Result<Vec<VideoListing>, AppError> {
        let rows = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, VideoListing>(
                r#"SELECT v.video_id, v.title, v.video_url, v.thumbnail_url, v.created_at,
                          c.channel_id, c.name AS channel_name,
                          c.profile_picture_url AS channel_profile_picture_url,
                          p.view_count
                   FROM videos v
                   JOIN channels c ON v.channel_id = c.channel_id
                   JOIN popular p ON v.video_id = p.video_id
                   ORDER BY v.created_at DESC, v.video_id"#,
            )
            .fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!("Fetched {} videos", rows.len());
        Ok(rows)
    }

    #[tracing::instrument(name = "Fetch short videos", skip(self))]
    async fn list_shorts(&self) -> Result<Vec<ShortVideo>, AppError> {
        let rows = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, ShortVideo>(
                r#"SELECT s.title, s.thumbnail_url
                   FROM videos_short s
                   JOIN channels c ON s.channel_id = c.channel_id
                   JOIN popular p ON s.video_id = p.video_id
                   ORDER BY s.created_at DESC, s.video_id"#,
            )
            .fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!("Fetched {} short videos", rows.len());
        Ok(rows)
    }

    #[tracing::instrument(name = "Fetch subscriptions for user", skip(self))]
    async fn subscriptions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SubscriptionRow>, AppError> {
        let rows = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, SubscriptionRow>(
                r#"SELECT u.user_id, u.username,
                          u.profile_picture_url AS user_profile_picture_url,
                          c.channel_id, c.name AS channel_name,
                          c.profile_picture_url AS channel_profile_picture_url
                   FROM users u
                   JOIN channel_subscribe cs ON u.user_id = cs.user_id
                   JOIN channels c ON cs.channel_id = c.channel_id
                   WHERE u.user_id = $1
                   ORDER BY c.name, c.channel_id"#,
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!("User {} has {} subscriptions", user_id, rows.len());
        Ok(rows)
    }

    #[tracing::instrument(name = "Search videos", skip(self))]
    async fn search_videos(&self, query: &str) -> Result<Vec<SearchResult>, AppError> {
        let pattern = like_pattern(query);

        let rows = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, SearchResult>(
                r#"SELECT v.video_id, v.title, v.created_at, v.thumbnail_url,
                          c.name AS channel_name,
                          c.profile_picture_url AS channel_profile_picture_url,
                          p.view_count
                   FROM videos v
                   JOIN channels c ON v.channel_id = c.channel_id
                   JOIN popular p ON v.video_id = p.video_id
                   WHERE v.title ILIKE $1 ESCAPE '\' OR c.name ILIKE $1 ESCAPE '\'
                   ORDER BY v.created_at DESC, v.video_id"#,
            )
            .bind(&pattern)
            .fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!("Search matched {} videos", rows.len());
        Ok(rows)
    }

    #[tracing::instrument(name = "Fetch watch details", skip(self))]
    async fn find_watch_video(
        &self,
        video_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<WatchVideo>, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, WatchVideo>(
                r#"SELECT v.video_id, v.title, v.description, v.duration, v.thumbnail_url,
                          v.video_url, v.created_at,
                          c.channel_id, c.name AS channel_name,
                          c.profile_picture_url AS channel_profile_picture_url,
                          p.view_count, p.like_count,
                          EXISTS (
                              SELECT 1 FROM channel_subscribe cs
                              WHERE cs.channel_id = v.channel_id AND cs.user_id = $2
                          ) AS is_subscribed
                   FROM videos v
                   JOIN channels c ON v.channel_id = c.channel_id
                   JOIN popular p ON v.video_id = p.video_id
                   WHERE v.video_id = $1"#,
            )
            .bind(video_id)
            .bind(viewer_id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    #[tracing::instrument(name = "Fetch comments for video", skip(self))]
    async fn comments_for_video(&self, video_id: &str) -> Result<Vec<CommentRecord>, AppError> {
        let rows = timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, CommentRecord>(
                r#"SELECT u.username, cm.comment_text, cm.comment_created_at
                   FROM comments cm
                   JOIN users u ON cm.user_id = u.user_id
                   WHERE cm.video_id = $1
                   ORDER BY cm.comment_created_at, cm.comment_id"#,
            )
            .bind(video_id)
            .fetch_all(&self.pool),
        )
        .await?;

        tracing::debug!("Video {} has {} comments", video_id, rows.len());
        Ok(rows)
    }

    #[tracing::instrument(name = "Saving new user in the database", skip(self, user), fields(username = %user.username, email = %user.email))]
    async fn create_user(&self, user: NewUser) -> Result<String, AppError> {
        let user_id = Uuid::new_v4().to_string();

        let result = timeout_query(
            self.query_timeout,
            sqlx::query(
                r#"INSERT INTO users (user_id, username, email, password_hash)
                   VALUES ($1, $2, $3, $4)"#,
            )
            .bind(&user_id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool),
        )
        .await;

        match result {
            Ok(_) => {
                tracing::info!("Successfully created user with id: {}", user_id);
                Ok(user_id)
            }
            Err(AppError::Conflict(detail)) => {
                tracing::warn!("Registration conflict: {}", detail);
                let field = if detail.contains("users_email_key") {
                    "email"
                } else {
                    "username"
                };
                Err(AppError::Conflict(format!("A user with this {} already exists", field)))
            }
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(name = "Fetch all users", skip(self))]
    async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        timeout_query(
            self.query_timeout,
            sqlx::query_as::<_, PublicUser>(
                r#"SELECT user_id, username, email, profile_picture_url, created_at
                   FROM users
                   ORDER BY created_at, user_id"#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }
}
