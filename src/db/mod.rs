//! Data access for the video platform.
//!
//! Handlers only see the [`VideoRepository`] trait; [`PgRepository`] is the
//! production implementation backed by a sized `sqlx` pool.

#[cfg(test)]
pub mod memory;
pub mod models;
mod postgres;

pub use postgres::PgRepository;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseSettings;
use crate::errors::AppError;
use models::{
    CommentRecord, NewUser, PublicUser, SearchResult, ShortVideo, SubscriptionRow, VideoListing,
    WatchVideo,
};

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Every video joined with its channel and popularity record.
    async fn list_videos(&self) -> Result<Vec<VideoListing>, AppError>;

    /// Short videos that have both a channel and a popularity record.
    async fn list_shorts(&self) -> Result<Vec<ShortVideo>, AppError>;

    async fn subscriptions_for_user(&self, user_id: &str)
        -> Result<Vec<SubscriptionRow>, AppError>;

    /// Case-insensitive substring match on video title or channel name.
    /// An empty query matches every video.
    async fn search_videos(&self, query: &str) -> Result<Vec<SearchResult>, AppError>;

    /// `viewer_id` is the caller whose subscription to the video's channel
    /// is reported; without one `is_subscribed` is false.
    async fn find_watch_video(
        &self,
        video_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<WatchVideo>, AppError>;

    /// Comments of a video, oldest first.
    async fn comments_for_video(&self, video_id: &str) -> Result<Vec<CommentRecord>, AppError>;

    /// Inserts the user and returns its generated id.
    async fn create_user(&self, user: NewUser) -> Result<String, AppError>;

    async fn list_users(&self) -> Result<Vec<PublicUser>, AppError>;
}

#[tracing::instrument(name = "Initialize database pool", skip(settings), fields(host = %settings.host, database = %settings.database_name))]
pub async fn init_db(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(settings.connect_options())
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        tls_ca = settings.ssl_ca_path.is_some(),
        "Connected to database"
    );

    if settings.run_migrations {
        tracing::info!("Applying database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    Ok(pool)
}

pub async fn timeout_query<T, F>(duration: std::time::Duration, fut: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(AppError::from(e)),
        Err(elapsed) => {
            tracing::error!("Query timeout after {:?}", duration);
            Err(AppError::Timeout(elapsed))
        }
    }
}

/// Builds a `LIKE` pattern matching `query` anywhere, with `\` as the escape
/// character so `%` and `_` in the query match literally.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
