use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::admin_controller;
use super::controller::{get_course, get_course_students, list_courses, set_grade};
use crate::state::AppState;

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/{id}", get(get_course))
        .route("/{id}/students", get(get_course_students))
        .route("/{id}/enrollments/{enrollment_id}/grade", put(set_grade))
}

/// Mounted under `/api/admin/courses` behind `require_admin`.
pub fn init_admin_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", post(admin_controller::create_course))
        .route(
            "/{id}",
            put(admin_controller::update_course).delete(admin_controller::delete_course),
        )
        .route("/{id}/enrollments", post(admin_controller::enroll_student))
        .route(
            "/{id}/enrollments/{student_id}",
            delete(admin_controller::unenroll_student),
        )
}
