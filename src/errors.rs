use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as StdError;

/// JSON body returned by every failing request.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = "user_id is required")]
    pub message: String,
    #[schema(example = 400)]
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict error: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Validation errors")]
    ValidationErrors(HashMap<String, Vec<String>>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Internal failures get a generic message; the cause is only logged.
        let (status, error_message, errors) = match &self {
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch data".to_string(),
                None,
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::Timeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "The database did not answer in time".to_string(),
                None,
            ),
            AppError::Unexpected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
                None,
            ),
            AppError::ValidationErrors(validation_errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(validation_errors.clone()),
            ),
        };

        if status.is_server_error() {
            tracing::error!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_type = %self,
                error_message = %error_message,
                status_code = %status,
                "Request rejected"
            );
        }

        if let AppError::Unexpected(e) | AppError::Database(e) = &self {
            let mut source_chain = String::new();
            let mut current_err: Option<&(dyn StdError + 'static)> = Some(e.as_ref());
            while let Some(err) = current_err {
                source_chain.push_str(&format!("\n  Caused by: {}", err));
                current_err = err.source();
            }
            if !source_chain.is_empty() {
                tracing::error!("Error source chain:{}", source_chain);
            }
        }

        let body = ErrorBody {
            message: error_message,
            status: status.as_u16(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                let what = db_err.constraint().unwrap_or("unique constraint").to_string();
                AppError::Conflict(format!("Record violates {}", what))
            }
            _ => AppError::Database(anyhow::Error::new(err).context("SQLx operation failed")),
        }
    }
}
