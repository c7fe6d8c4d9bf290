//! In-memory repository used by the handler tests. It mirrors the joins and
//! orderings of the SQL queries and counts every call, so tests can assert
//! that a rejected request never reached the data layer.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use super::models::{
    CommentRecord, NewUser, PublicUser, SearchResult, ShortVideo, SubscriptionRow, VideoListing,
    WatchVideo,
};
use super::VideoRepository;
use crate::errors::AppError;

#[derive(Clone)]
pub struct ChannelRecord {
    pub channel_id: String,
    pub name: String,
    pub profile_picture_url: Option<String>,
}

#[derive(Clone)]
pub struct VideoRecord {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PopularRecord {
    pub video_id: String,
    pub view_count: i64,
    pub like_count: i64,
}

#[derive(Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CommentRow {
    pub comment_id: i64,
    pub video_id: String,
    pub user_id: String,
    pub comment_text: String,
    pub comment_created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct Dataset {
    pub channels: Vec<ChannelRecord>,
    pub videos: Vec<VideoRecord>,
    pub shorts: Vec<VideoRecord>,
    pub popular: Vec<PopularRecord>,
    pub users: Vec<UserRecord>,
    pub subscriptions: Vec<(String, String)>,
    pub comments: Vec<CommentRow>,
}

impl Dataset {
    fn channel(&self, channel_id: &str) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }

    fn popularity(&self, video_id: &str) -> Option<&PopularRecord> {
        self.popular.iter().find(|p| p.video_id == video_id)
    }

    /// Inner join of videos with channels and popular, newest first.
    fn joined_videos(&self) -> Vec<(&VideoRecord, &ChannelRecord, &PopularRecord)> {
        let mut rows: Vec<_> = self
            .videos
            .iter()
            .filter_map(|v| Some((v, self.channel(&v.channel_id)?, self.popularity(&v.video_id)?)))
            .collect();
        rows.sort_by(|a, b| {
            b.0.created_at
                .cmp(&a.0.created_at)
                .then_with(|| a.0.video_id.cmp(&b.0.video_id))
        });
        rows
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    data: RwLock<Dataset>,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay_ms: AtomicU64,
}

impl InMemoryRepository {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: RwLock::new(data),
            ..Default::default()
        }
    }

    /// Two channels, three videos (one without comments), two shorts (one
    /// without a popularity record), two users, one subscription and three
    /// comments, one of which contains `": "`.
    pub fn seeded() -> Self {
        let base = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("fixed datetime should be valid");

        let channel = |id: &str, name: &str| ChannelRecord {
            channel_id: id.to_string(),
            name: name.to_string(),
            profile_picture_url: Some(format!("https://img.example/{id}.png")),
        };
        let video = |id: &str, channel_id: &str, title: &str, days: i64| VideoRecord {
            video_id: id.to_string(),
            channel_id: channel_id.to_string(),
            title: title.to_string(),
            video_url: format!("https://cdn.example/{id}.mp4"),
            thumbnail_url: Some(format!("https://img.example/{id}.jpg")),
            description: Some(format!("About {title}")),
            duration: Some(600),
            created_at: base + Duration::days(days),
        };
        let popular = |id: &str, views: i64, likes: i64| PopularRecord {
            video_id: id.to_string(),
            view_count: views,
            like_count: likes,
        };
        let user = |id: &str, name: &str| UserRecord {
            user_id: id.to_string(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "$argon2id$v=19$m=15000,t=2,p=1$seed".to_string(),
            profile_picture_url: None,
            created_at: base,
        };
        let comment = |id: i64, video_id: &str, user_id: &str, text: &str, minutes: i64| CommentRow {
            comment_id: id,
            video_id: video_id.to_string(),
            user_id: user_id.to_string(),
            comment_text: text.to_string(),
            comment_created_at: base + Duration::minutes(minutes),
        };

        Self::new(Dataset {
            channels: vec![
                channel("ch-rust", "Rustacean Station"),
                channel("ch-cook", "Kitchen Corner"),
            ],
            videos: vec![
                video("v-async", "ch-rust", "Async Rust in Practice", 3),
                video("v-bread", "ch-cook", "Sourdough Basics", 2),
                video("v-quiet", "ch-cook", "Knife Skills", 1),
            ],
            shorts: vec![
                video("s-borrow", "ch-rust", "Borrowing in 60s", 1),
                video("s-orphan", "ch-cook", "Untracked Short", 2),
            ],
            popular: vec![
                popular("v-async", 1500, 120),
                popular("v-bread", 900, 80),
                popular("v-quiet", 12, 1),
                popular("s-borrow", 300, 40),
            ],
            users: vec![user("u-alice", "alice"), user("u-bob", "bob")],
            subscriptions: vec![("u-alice".to_string(), "ch-rust".to_string())],
            comments: vec![
                comment(2, "v-async", "u-bob", "note: pinning explained well", 5),
                comment(1, "v-async", "u-alice", "Great video!", 1),
                comment(3, "v-bread", "u-bob", "Tried it, worked", 2),
            ],
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail like an unreachable database.
    pub fn fail_queries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn user_by_username(&self, username: &str) -> Option<UserRecord> {
        self.read().users.iter().find(|u| u.username == username).cloned()
    }

    pub fn add_user(&self, user_id: &str, username: &str) {
        self.write().users.push(UserRecord {
            user_id: user_id.to_string(),
            username: username.to_string(),
            email: format!("{user_id}@example.com"),
            password_hash: "$argon2id$placeholder".to_string(),
            profile_picture_url: None,
            created_at: Utc::now(),
        });
    }

    pub fn add_comment(&self, video_id: &str, user_id: &str, text: &str) {
        let mut data = self.write();
        let next_id = data.comments.iter().map(|c| c.comment_id).max().unwrap_or(0) + 1;
        data.comments.push(CommentRow {
            comment_id: next_id,
            video_id: video_id.to_string(),
            user_id: user_id.to_string(),
            comment_text: text.to_string(),
            comment_created_at: Utc::now(),
        });
    }

    /// Makes every later call sleep for `delay` before answering.
    pub fn delay_queries(&self, delay: std::time::Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn enter(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Database(anyhow::anyhow!("connection refused")));
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Dataset> {
        self.data.read().expect("dataset lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Dataset> {
        self.data.write().expect("dataset lock poisoned")
    }
}

#[async_trait]
impl VideoRepository for InMemoryRepository {
    async fn list_videos(&self) -> Result<Vec<VideoListing>, AppError> {
        self.enter().await?;
        let data = self.read();
        Ok(data
            .joined_videos()
            .into_iter()
            .map(|(v, c, p)| VideoListing {
                video_id: v.video_id.clone(),
                title: v.title.clone(),
                video_url: v.video_url.clone(),
                thumbnail_url: v.thumbnail_url.clone(),
                created_at: v.created_at,
                channel_id: c.channel_id.clone(),
                channel_name: c.name.clone(),
                channel_profile_picture_url: c.profile_picture_url.clone(),
                view_count: p.view_count,
            })
            .collect())
    }

    async fn list_shorts(&self) -> Result<Vec<ShortVideo>, AppError> {
        self.enter().await?;
        let data = self.read();
        let mut shorts: Vec<&VideoRecord> = data
            .shorts
            .iter()
            .filter(|s| data.channel(&s.channel_id).is_some() && data.popularity(&s.video_id).is_some())
            .collect();
        shorts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.video_id.cmp(&b.video_id)));
        Ok(shorts
            .into_iter()
            .map(|s| ShortVideo {
                title: s.title.clone(),
                thumbnail_url: s.thumbnail_url.clone(),
            })
            .collect())
    }

    async fn subscriptions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<SubscriptionRow>, AppError> {
        self.enter().await?;
        let data = self.read();
        let Some(user) = data.users.iter().find(|u| u.user_id == user_id) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<SubscriptionRow> = data
            .subscriptions
            .iter()
            .filter(|(u, _)| u == user_id)
            .filter_map(|(_, channel_id)| data.channel(channel_id))
            .map(|c| SubscriptionRow {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
                user_profile_picture_url: user.profile_picture_url.clone(),
                channel_id: c.channel_id.clone(),
                channel_name: c.name.clone(),
                channel_profile_picture_url: c.profile_picture_url.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.channel_name.cmp(&b.channel_name).then_with(|| a.channel_id.cmp(&b.channel_id)));
        Ok(rows)
    }

    async fn search_videos(&self, query: &str) -> Result<Vec<SearchResult>, AppError> {
        self.enter().await?;
        let needle = query.to_lowercase();
        let data = self.read();
        Ok(data
            .joined_videos()
            .into_iter()
            .filter(|(v, c, _)| {
                v.title.to_lowercase().contains(&needle) || c.name.to_lowercase().contains(&needle)
            })
            .map(|(v, c, p)| SearchResult {
                video_id: v.video_id.clone(),
                title: v.title.clone(),
                created_at: v.created_at,
                thumbnail_url: v.thumbnail_url.clone(),
                channel_name: c.name.clone(),
                channel_profile_picture_url: c.profile_picture_url.clone(),
                view_count: p.view_count,
            })
            .collect())
    }

    async fn find_watch_video(
        &self,
        video_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<WatchVideo>, AppError> {
        self.enter().await?;
        let data = self.read();
        Ok(data
            .joined_videos()
            .into_iter()
            .find(|(v, _, _)| v.video_id == video_id)
            .map(|(v, c, p)| WatchVideo {
                video_id: v.video_id.clone(),
                title: v.title.clone(),
                description: v.description.clone(),
                duration: v.duration,
                thumbnail_url: v.thumbnail_url.clone(),
                video_url: v.video_url.clone(),
                created_at: v.created_at,
                channel_id: c.channel_id.clone(),
                channel_name: c.name.clone(),
                channel_profile_picture_url: c.profile_picture_url.clone(),
                view_count: p.view_count,
                like_count: p.like_count,
                is_subscribed: viewer_id.is_some_and(|viewer| {
                    data.subscriptions
                        .iter()
                        .any(|(u, ch)| u == viewer && *ch == v.channel_id)
                }),
            }))
    }

    async fn comments_for_video(&self, video_id: &str) -> Result<Vec<CommentRecord>, AppError> {
        self.enter().await?;
        let data = self.read();
        let mut rows: Vec<&CommentRow> = data.comments.iter().filter(|c| c.video_id == video_id).collect();
        rows.sort_by(|a, b| {
            a.comment_created_at
                .cmp(&b.comment_created_at)
                .then_with(|| a.comment_id.cmp(&b.comment_id))
        });
        Ok(rows
            .into_iter()
            .filter_map(|c| {
                let user = data.users.iter().find(|u| u.user_id == c.user_id)?;
                Some(CommentRecord {
                    username: user.username.clone(),
                    comment_text: c.comment_text.clone(),
                    comment_created_at: c.comment_created_at,
                })
            })
            .collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<String, AppError> {
        self.enter().await?;
        let mut data = self.write();
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("A user with this email already exists".to_string()));
        }
        if data.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("A user with this username already exists".to_string()));
        }
        let user_id = Uuid::new_v4().to_string();
        data.users.push(UserRecord {
            user_id: user_id.clone(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            profile_picture_url: None,
            created_at: Utc::now(),
        });
        Ok(user_id)
    }

    async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        self.enter().await?;
        let data = self.read();
        let mut users: Vec<PublicUser> = data
            .users
            .iter()
            .map(|u| PublicUser {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                email: u.email.clone(),
                profile_picture_url: u.profile_picture_url.clone(),
                created_at: u.created_at,
            })
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(users)
    }
}
