use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use schoolhub_core::AppError;
use tracing::instrument;
use uuid::Uuid;

use super::model::{CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams};
use super::service::{NewUser, UserService};
use crate::middleware::role::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("email" = Option<String>, Query, description = "Case-insensitive email substring"),
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        schoolhub_core::PaginationParams
    ),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(&state.db, filters).await?;
    Ok(Json(users))
}

/// Create a user with any role
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Email already registered", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(
        &state.db,
        NewUser {
            email: dto.email,
            password: dto.password,
            first_name: dto.first_name,
            last_name: dto.last_name,
            role: dto.role,
            phone_number: dto.phone_number,
            date_of_birth: dto.date_of_birth,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_user(&state.db, id).await?;
    Ok(Json(user))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Email already in use", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_user(&state.db, id, dto).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account or user has loans", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UserService::delete_user(&state.db, admin.user_id()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Suspend a user
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/suspend",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User suspended", body = User),
        (status = 400, description = "Cannot suspend own account", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %id))]
pub async fn suspend_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = UserService::suspend_user(&state.db, admin.user_id()?, id).await?;
    Ok(Json(user))
}

/// Lift a suspension
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/reinstate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User reinstated", body = User),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %id))]
pub async fn reinstate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = UserService::reinstate_user(&state.db, id).await?;
    Ok(Json(user))
}
