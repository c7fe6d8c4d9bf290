use crate::errors::AppError;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use secrecy::{ExposeSecret, Secret};

/// Hashes `password` with Argon2id into a PHC string.
///
/// Runs on the blocking pool so the hash does not stall the request executor.
#[tracing::instrument(name = "Compute password hash", skip(password))]
pub async fn compute_password_hash(password: Secret<String>) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_with_argon2(password.expose_secret()))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {:?}", e);
            AppError::Unexpected(anyhow::Error::new(e).context("Password hashing task panicked"))
        })?
}

fn hash_with_argon2(password: &str) -> Result<String, AppError> {
    tracing::debug!("Generating random salt");
    let salt = SaltString::generate(&mut rand::thread_rng());

    let params = Params::new(15000, 2, 1, None).map_err(|e| {
        tracing::error!("Failed to create Argon2 parameters: {:?}", e);
        AppError::Unexpected(anyhow::Error::new(e).context("Failed to create Argon2 params"))
    })?;

    let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = hasher
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            AppError::Unexpected(anyhow::Error::new(e).context("Failed to hash password"))
        })?
        .to_string();

    tracing::debug!("Password hash computed (length: {})", password_hash.len());
    Ok(password_hash)
}
