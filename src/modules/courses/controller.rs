use axum::{
    Json,
    extract::{Path, Query, State},
};
use schoolhub_auth::UserRole;
use schoolhub_core::AppError;
use tracing::instrument;
use uuid::Uuid;

use super::model::{
    CourseFilterParams, CourseStudent, CourseWithTeacher, PaginatedCoursesResponse, SetGradeDto,
};
use super::service::CourseService;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::enrollments::model::Enrollment;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List courses
#[utoipa::path(
    get,
    path = "/api/courses",
    params(
        ("teacher_id" = Option<Uuid>, Query, description = "Only courses taught by this teacher"),
        schoolhub_core::PaginationParams
    ),
    responses(
        (status = 200, description = "Paginated courses", body = PaginatedCoursesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filters): Query<CourseFilterParams>,
) -> Result<Json<PaginatedCoursesResponse>, AppError> {
    let courses = CourseService::list_courses(&state.db, filters).await?;
    Ok(Json(courses))
}

/// Get a course
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = CourseWithTeacher),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseWithTeacher>, AppError> {
    let course = CourseService::get_course(&state.db, id).await?;
    Ok(Json(course))
}

/// List the students enrolled in a course
#[utoipa::path(
    get,
    path = "/api/courses/{id}/students",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course roster", body = Vec<CourseStudent>),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id))]
pub async fn get_course_students(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CourseStudent>>, AppError> {
    let students = CourseService::get_course_students(&state.db, id).await?;
    Ok(Json(students))
}

/// Set a student's grade
#[utoipa::path(
    put,
    path = "/api/courses/{id}/enrollments/{enrollment_id}/grade",
    params(
        ("id" = Uuid, Path, description = "Course ID"),
        ("enrollment_id" = Uuid, Path, description = "Enrollment ID")
    ),
    request_body = SetGradeDto,
    responses(
        (status = 200, description = "Grade set", body = Enrollment),
        (status = 403, description = "Not the course teacher", body = ErrorResponse),
        (status = 404, description = "Course or enrollment not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(course.id = %id, enrollment.id = %enrollment_id))]
pub async fn set_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, enrollment_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<SetGradeDto>,
) -> Result<Json<Enrollment>, AppError> {
    check_role(&auth_user, UserRole::Teacher)?;
    let enrollment = CourseService::set_grade(
        &state.db,
        auth_user.user_id()?,
        auth_user.role(),
        id,
        enrollment_id,
        &dto.grade,
    )
    .await?;
    Ok(Json(enrollment))
}
