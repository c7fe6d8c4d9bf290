use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::AppForm;
use crate::authentication::compute_password_hash;
use crate::db::models::{NewUser, PublicUser};
use crate::errors::{AppError, ErrorBody};
use crate::InnerState;

/// Registration form. Missing fields deserialize as empty and fail validation.
#[derive(Deserialize, ToSchema)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[schema(format = Password)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub message: String,
    pub user_id: String,
}

fn validate_registration(form: &RegistrationForm) -> Result<(), AppError> {
    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    let mut reject = |field: &str, message: &str| {
        errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    };

    if form.username.trim().is_empty() {
        reject("username", "username is required");
    }
    let email = form.email.trim();
    if email.is_empty() {
        reject("email", "email is required");
    } else if !email.contains('@') {
        reject("email", "email must contain '@'");
    }
    if form.password.is_empty() {
        reject("password", "password is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationErrors(errors))
    }
}

/// Registers a user. The password is stored as an Argon2id hash.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    summary = "Register a new user",
    request_body(content = RegistrationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User registered", body = RegistrationResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 409, description = "Username or email already taken", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "Register new user", skip(inner, form), fields(username = %form.username, email = %form.email))]
pub async fn register_user(
    State(inner): State<InnerState>,
    AppForm(form): AppForm<RegistrationForm>,
) -> Result<Json<RegistrationResponse>, AppError> {
    validate_registration(&form)?;

    let RegistrationForm {
        username,
        email,
        password,
    } = form;

    let password_hash = compute_password_hash(Secret::new(password)).await?;

    let user_id = inner
        .repo
        .create_user(NewUser {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
        })
        .await?;

    tracing::info!("User registered successfully with id {}", user_id);
    Ok(Json(RegistrationResponse {
        message: "Registration successful".to_string(),
        user_id,
    }))
}

/// Every user, without credential fields. Unpaginated.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    summary = "Retrieve a list of users",
    responses(
        (status = 200, description = "A JSON array of users", body = Vec<PublicUser>),
        (status = 500, description = "Database failure", body = ErrorBody),
    ),
)]
#[tracing::instrument(name = "List users", skip(inner))]
pub async fn all_users(State(inner): State<InnerState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = inner.repo.list_users().await?;
    tracing::info!("Returning {} users", users.len());
    Ok(Json(users))
}
