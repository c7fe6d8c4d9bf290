use axum::body::{to_bytes, Body};
use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Request};
use axum::Form;
use serde::de::DeserializeOwned;

use crate::errors::AppError;

const FORM_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// A `Form<T>` wrapper whose rejections are `AppError`s, so malformed form
/// posts get the same JSON error body as every other failure.
///
/// An empty body is decoded as an empty form whatever its content type, which
/// lets `#[serde(default)]` fields reach the handler's own validation.
pub struct AppForm<T>(pub T);

impl<S, T> FromRequest<S> for AppForm<T>
where
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, FORM_BODY_LIMIT)
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read request body: {}", e)))?;

        if bytes.is_empty() {
            let value = serde_urlencoded::from_str("")
                .map_err(|e| AppError::Validation(format!("Failed to deserialize form: {}", e)))?;
            return Ok(AppForm(value));
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(AppForm(value))
    }
}
