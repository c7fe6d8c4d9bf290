//! V1 API route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::v1::search::search_videos;
use crate::api::v1::subscriptions::user_subscriptions;
use crate::api::v1::user::{all_users, register_user};
use crate::api::v1::videos::{all_videos, short_videos};
use crate::api::v1::watch::watch_video;
use crate::InnerState;

#[tracing::instrument(name = "create_v1_routes")]
pub fn create_v1_routes() -> Router<InnerState> {
    tracing::info!("Setting up V1 API routes");

    Router::new()
        // Video listings
        .route("/", get(all_videos))
        .route("/short", get(short_videos))
        .route("/result", get(search_videos))
        .route("/watch", get(watch_video))

        // Subscriptions
        .route("/subscribe", get(user_subscriptions))

        // Users
        .route("/register", post(register_user))
        .route("/users", get(all_users))
}
