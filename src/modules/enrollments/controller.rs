use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use schoolhub_auth::UserRole;
use schoolhub_core::AppError;
use tracing::instrument;
use uuid::Uuid;

use super::model::{Enrollment, EnrollmentWithCourse};
use super::service::EnrollmentService;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

/// List the caller's enrollments
#[utoipa::path(
    get,
    path = "/api/enrollments",
    responses(
        (status = 200, description = "Enrollments with course details", body = Vec<EnrollmentWithCourse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn my_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<EnrollmentWithCourse>>, AppError> {
    let enrollments = EnrollmentService::list_for_student(&state.db, auth_user.user_id()?).await?;
    Ok(Json(enrollments))
}

/// Enroll the caller in a course
#[utoipa::path(
    post,
    path = "/api/enrollments/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 403, description = "Only students can enroll", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %course_id))]
pub async fn enroll(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    if auth_user.role() != UserRole::Student {
        return Err(AppError::forbidden(
            "Only students can enroll in courses".to_string(),
        ));
    }
    let enrollment = EnrollmentService::enroll(&state.db, course_id, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Withdraw from a course
#[utoipa::path(
    delete,
    path = "/api/enrollments/{enrollment_id}",
    params(("enrollment_id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment withdrawn"),
        (status = 403, description = "Not the owner of this enrollment", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Enrollments",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(enrollment.id = %enrollment_id))]
pub async fn withdraw(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(enrollment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_any_role(&auth_user, &[UserRole::Student])?;
    EnrollmentService::withdraw(
        &state.db,
        auth_user.user_id()?,
        auth_user.role(),
        enrollment_id,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
