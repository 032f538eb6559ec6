use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// [`hash_password`] on the blocking pool. bcrypt at `DEFAULT_COST` takes
/// long enough to stall a runtime worker.
pub async fn hash_password_async(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal_error(format!("Password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_async(password: &str, hash: &str) -> Result<bool, AppError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal_error(format!("Password check task failed: {}", e)))?
}

pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::unprocessable(anyhow::anyhow!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_short_password_rejected() {
        let err = validate_password_strength("short").unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.error.to_string(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_exact_minimum_accepted() {
        assert!(validate_password_strength("12345678").is_ok());
    }

    #[tokio::test]
    async fn test_async_variants_agree_with_sync() {
        let hashed = hash_password_async("blocking-pool-pass").await.unwrap();
        assert!(verify_password("blocking-pool-pass", &hashed).unwrap());
        assert!(verify_password_async("blocking-pool-pass", &hashed).await.unwrap());
        assert!(!verify_password_async("other-pass", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_async_verify_rejects_malformed_hash() {
        let err = verify_password_async("anything", "not-a-hash").await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 7 characters, 14 bytes
        assert!(validate_password_strength("ééééééé").is_err());
    }
}
