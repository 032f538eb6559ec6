use chrono::{NaiveDate, Utc};
use schoolhub_auth::UserRole;
use schoolhub_core::{
    AppError, PaginationMeta, contains_pattern, hash_password_async, validate_password_strength,
    verify_password_async,
};
use schoolhub_observability as observability;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::model::{
    ChangePasswordDto, PaginatedUsersResponse, USER_COLUMNS, UpdateProfileDto, UpdateUserDto,
    User, UserFilterParams,
};

/// Everything needed to insert an account. The password is plain text and
/// is hashed by [`UserService::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_conflict(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow::anyhow!("{}", message));
    }
    error!(error = %e, "Database error writing user");
    AppError::from(e)
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db, new_user), fields(user.role = %new_user.role, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(db: &PgPool, new_user: NewUser) -> Result<User, AppError> {
        validate_password_strength(&new_user.password)?;
        let password_hash = hash_password_async(&new_user.password).await?;
        let email = normalize_email(&new_user.email);

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, role, first_name, last_name, phone_number, date_of_birth)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(new_user.role)
        .bind(new_user.first_name.trim())
        .bind(new_user.last_name.trim())
        .bind(&new_user.phone_number)
        .bind(new_user.date_of_birth)
        .fetch_one(db)
        .await
        .map_err(|e| email_conflict(e, "Email already registered"))?;

        observability::track_user_created(user.role.as_str());
        info!(user.id = %user.id, "User created");

        Ok(user)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| {
                debug!(user.id = %user_id, "User not found");
                AppError::not_found(anyhow::anyhow!("User not found"))
            })
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        let email = dto.email.as_deref().map(normalize_email);

        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone_number = COALESCE($5, phone_number),
                date_of_birth = COALESCE($6, date_of_birth),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(email)
        .bind(dto.phone_number)
        .bind(dto.date_of_birth)
        .fetch_optional(db)
        .await
        .map_err(|e| email_conflict(e, "Email already in use"))?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let current_hash: String =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !verify_password_async(&dto.current_password, &current_hash).await? {
            warn!(user.id = %user_id, "Password change with wrong current password");
            return Err(AppError::unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password_strength(&dto.new_password)?;
        let new_hash = hash_password_async(&dto.new_password).await?;

        sqlx::query(
            "UPDATE users SET password_hash = $2, last_password_change = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(&new_hash)
        .execute(db)
        .await?;

        info!(user.id = %user_id, "Password changed");
        Ok(())
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(role) = filters.role {
            params.push(role.as_str().to_string());
            where_clause.push_str(&format!(" AND role = ${}::user_role", params.len()));
        }

        if let Some(email) = &filters.email {
            params.push(contains_pattern(email));
            where_clause.push_str(&format!(" AND email ILIKE ${} ESCAPE '\\'", params.len()));
        }

        if let Some(name) = &filters.name {
            params.push(contains_pattern(name));
            where_clause.push_str(&format!(
                " AND (first_name ILIKE ${n} ESCAPE '\\' OR last_name ILIKE ${n} ESCAPE '\\' \
                 OR (first_name || ' ' || last_name) ILIKE ${n} ESCAPE '\\')",
                n = params.len()
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM users{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM users{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            USER_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, User>(&data_query);
        for param in &params {
            data_sql = data_sql.bind(param);
        }
        let users = data_sql.fetch_all(db).await?;

        debug!(total, returned = users.len(), "Users fetched");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let email = dto.email.as_deref().map(normalize_email);

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(dto.first_name.as_deref().map(str::trim))
        .bind(dto.last_name.as_deref().map(str::trim))
        .bind(email)
        .bind(dto.role)
        .bind(dto.is_active)
        .fetch_optional(db)
        .await
        .map_err(|e| email_conflict(e, "Email already in use"))?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        info!(user.id = %user.id, "User updated by admin");
        Ok(user)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &PgPool, actor_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if actor_id == user_id {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "You cannot delete your own account"
            )));
        }

        let mut tx = db.begin().await?;

        // Checkout holds this lock while it inserts the issue.
        sqlx::query("SELECT id FROM library_cards WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let on_loan: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_issues WHERE user_id = $1 AND status = 'issued'",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if on_loan > 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User still has {} book(s) on loan",
                on_loan
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        tx.commit().await?;

        info!(user.id = %user_id, actor.id = %actor_id, "User deleted");
        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn suspend_user(
        db: &PgPool,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<User, AppError> {
        if actor_id == user_id {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "You cannot suspend your own account"
            )));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_suspended = TRUE, suspended_at = $2, suspended_by = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(Utc::now())
        .bind(actor_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        warn!(user.id = %user_id, actor.id = %actor_id, "User suspended");
        Ok(user)
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn reinstate_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_suspended = FALSE, suspended_at = NULL, suspended_by = NULL, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        info!(user.id = %user_id, "User reinstated");
        Ok(user)
    }

    /// Loads a user and checks it has `role`; used when another record
    /// points at a teacher or student.
    pub async fn require_role(
        db: &PgPool,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("User {} does not exist", user_id)))?;

        if user.role != role {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User {} is not a {}",
                user_id,
                role
            )));
        }

        Ok(user)
    }
}
