use schoolhub_auth::UserRole;
use schoolhub_core::{hash_password, validate_password_strength};
use sqlx::PgPool;
use uuid::Uuid;

/// Inserts an admin account. Fails when the email is taken.
pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    validate_password_strength(password).map_err(|e| e.error.to_string())?;
    let password_hash =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, password_hash, role, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(UserRole::Admin)
    .bind(first_name.trim())
    .bind(last_name.trim())
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}
