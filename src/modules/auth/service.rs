use chrono::Utc;
use schoolhub_auth::{UserRole, create_access_token};
use schoolhub_config::JwtConfig;
use schoolhub_core::{AppError, hash_password_async, verify_password_async};
use schoolhub_models::users::{USER_COLUMNS, User, UserCredentials};
use schoolhub_observability as observability;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use super::model::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use crate::modules::users::service::{NewUser, UserService};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Roles a visitor may pick for themselves.
pub fn signup_role(requested: Option<UserRole>) -> Result<UserRole, AppError> {
    match requested.unwrap_or_default() {
        UserRole::Admin => Err(AppError::forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        )),
        role => Ok(role),
    }
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "users"))]
    pub async fn signup(db: &PgPool, dto: SignupRequest) -> Result<SignupResponse, AppError> {
        let role = signup_role(dto.role)?;

        let user = UserService::create_user(
            db,
            NewUser {
                email: dto.email,
                password: dto.password,
                first_name: dto.first_name,
                last_name: dto.last_name,
                role,
                phone_number: None,
                date_of_birth: None,
            },
        )
        .await?;

        info!(user.id = %user.id, user.role = %user.role, "User signed up");

        Ok(SignupResponse {
            message: "User registered successfully".to_string(),
            user,
        })
    }

    #[instrument(skip(db, dto, jwt_config), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, password_hash, role, is_active, is_suspended
             FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some(credentials) = credentials else {
            // Same bcrypt cost as a real verify, so unknown emails answer no faster.
            hash_password_async(&dto.password).await?;
            debug!("Login attempt for unknown email");
            observability::track_user_login_failure("invalid_credentials");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password_async(&dto.password, &credentials.password_hash).await? {
            debug!(user.id = %credentials.id, "Login attempt with wrong password");
            observability::track_user_login_failure("invalid_credentials");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !credentials.is_active {
            warn!(user.id = %credentials.id, "Login attempt on inactive account");
            observability::track_user_login_failure("inactive");
            return Err(AppError::forbidden("Account is inactive".to_string()));
        }

        if credentials.is_suspended {
            warn!(user.id = %credentials.id, "Login attempt on suspended account");
            observability::track_user_login_failure("suspended");
            return Err(AppError::forbidden("Account is suspended".to_string()));
        }

        let token = create_access_token(
            credentials.id,
            &credentials.email,
            credentials.role,
            jwt_config,
        )?;
        observability::track_jwt_issued();

        let user: User = sqlx::query_as(&format!(
            "UPDATE users SET last_login = $2 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(credentials.id)
        .bind(Utc::now())
        .fetch_one(db)
        .await?;

        observability::track_user_login_success(credentials.role.as_str());
        info!(user.id = %credentials.id, "User logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_role_defaults_to_student() {
        assert_eq!(signup_role(None).unwrap(), UserRole::Student);
    }

    #[test]
    fn test_signup_role_allows_non_admin_roles() {
        for role in [UserRole::Teacher, UserRole::Student, UserRole::Parent] {
            assert_eq!(signup_role(Some(role)).unwrap(), role);
        }
    }

    #[test]
    fn test_signup_role_rejects_admin() {
        let err = signup_role(Some(UserRole::Admin)).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }
}
