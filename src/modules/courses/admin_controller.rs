use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use schoolhub_core::AppError;
use tracing::instrument;
use uuid::Uuid;

use super::model::{AdminEnrollDto, Course, CreateCourseDto, UpdateCourseDto};
use super::service::CourseService;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::enrollments::model::Enrollment;
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a course
#[utoipa::path(
    post,
    path = "/api/admin/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "teacher_id is not a teacher", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 409, description = "Course code already exists", body = ErrorResponse)
    ),
    tag = "Admin Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/api/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "teacher_id is not a teacher", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Course code already exists", body = ErrorResponse)
    ),
    tag = "Admin Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id))]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::update_course(&state.db, id, dto).await?;
    Ok(Json(course))
}

/// Delete a course and its enrollments
#[utoipa::path(
    delete,
    path = "/api/admin/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Admin Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id))]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CourseService::delete_course(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enroll a student in a course
#[utoipa::path(
    post,
    path = "/api/admin/courses/{id}/enrollments",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = AdminEnrollDto,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "User is not a student", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse)
    ),
    tag = "Admin Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id))]
pub async fn enroll_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AdminEnrollDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = EnrollmentService::enroll_student(&state.db, id, dto.student_id).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Remove a student from a course
#[utoipa::path(
    delete,
    path = "/api/admin/courses/{id}/enrollments/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Course ID"),
        ("student_id" = Uuid, Path, description = "Student user ID")
    ),
    responses(
        (status = 204, description = "Student unenrolled"),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Admin Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id, student.id = %student_id))]
pub async fn unenroll_student(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    EnrollmentService::unenroll_student(&state.db, id, student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
