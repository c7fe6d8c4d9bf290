use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::common::require_param;
use crate::db::models::SubscriptionRow;
use crate::errors::{AppError, ErrorBody};
use crate::InnerState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionParams {
    /// The ID of the user.
    pub user_id: Option<String>,
}

/// Channels the given user subscribes to. An unknown user yields `[]`.
#[utoipa::path(
    get,
    path = "/subscribe",
    tag = "Subscriptions",
    summary = "Retrieve a list of subscribed channels for a user",
    params(SubscriptionParams),
    responses(
        (status = 200, description = "A JSON array of subscribed channels", body = Vec<SubscriptionRow>),
        (status = 400, description = "user_id is missing", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "List subscriptions", skip(inner))]
pub async fn user_subscriptions(
    State(inner): State<InnerState>,
    Query(params): Query<SubscriptionParams>,
) -> Result<Json<Vec<SubscriptionRow>>, AppError> {
    let user_id = require_param(params.user_id, "user_id")?;

    let rows = inner.repo.subscriptions_for_user(&user_id).await?;
    tracing::info!("User {} has {} subscriptions", user_id, rows.len());
    Ok(Json(rows))
}
