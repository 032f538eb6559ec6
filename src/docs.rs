use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    LoginRequest, LoginResponse, MessageResponse, SignupRequest, SignupResponse,
};
use crate::modules::courses::model::{
    AdminEnrollDto, Course, CourseStudent, CourseWithTeacher, CreateCourseDto,
    PaginatedCoursesResponse, SetGradeDto, UpdateCourseDto,
};
use crate::modules::enrollments::model::{Enrollment, EnrollmentWithCourse};
use crate::modules::health::controller::HealthResponse;
use crate::modules::library::model::{
    Book, BookCategory, BookIssue, CardStatus, CheckoutDto, CreateBookDto, CreateCategoryDto,
    FinePayment, FineSummary, IssueStatus, IssueWithDetails, LibraryCard, PaginatedBooksResponse,
    PayFineDto, PaymentMode, UpdateBookDto, UpdateCardStatusDto,
};
use crate::modules::users::model::{
    ChangePasswordDto, CreateUserDto, PaginatedUsersResponse, UpdateProfileDto, UpdateUserDto,
    User,
};
use schoolhub_auth::UserRole;
use schoolhub_core::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::auth::controller::signup,
        crate::modules::auth::controller::login,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::change_password,
        crate::modules::users::admin_controller::list_users,
        crate::modules::users::admin_controller::create_user,
        crate::modules::users::admin_controller::get_user,
        crate::modules::users::admin_controller::update_user,
        crate::modules::users::admin_controller::delete_user,
        crate::modules::users::admin_controller::suspend_user,
        crate::modules::users::admin_controller::reinstate_user,
        crate::modules::courses::controller::list_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::get_course_students,
        crate::modules::courses::controller::set_grade,
        crate::modules::courses::admin_controller::create_course,
        crate::modules::courses::admin_controller::update_course,
        crate::modules::courses::admin_controller::delete_course,
        crate::modules::courses::admin_controller::enroll_student,
        crate::modules::courses::admin_controller::unenroll_student,
        crate::modules::enrollments::controller::my_enrollments,
        crate::modules::enrollments::controller::enroll,
        crate::modules::enrollments::controller::withdraw,
        crate::modules::library::controller::create_category,
        crate::modules::library::controller::list_categories,
        crate::modules::library::controller::create_book,
        crate::modules::library::controller::list_books,
        crate::modules::library::controller::get_book,
        crate::modules::library::controller::update_book,
        crate::modules::library::controller::delete_book,
        crate::modules::library::controller::issue_card,
        crate::modules::library::controller::get_card,
        crate::modules::library::controller::update_card_status,
        crate::modules::library::controller::checkout,
        crate::modules::library::controller::return_book,
        crate::modules::library::controller::list_overdue,
        crate::modules::library::controller::my_history,
        crate::modules::library::controller::user_history,
        crate::modules::library::controller::get_fine,
        crate::modules::library::controller::pay_fine,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            PaginationMeta,
            PaginationParams,
            UserRole,
            User,
            SignupRequest,
            SignupResponse,
            LoginRequest,
            LoginResponse,
            CreateUserDto,
            UpdateUserDto,
            UpdateProfileDto,
            ChangePasswordDto,
            PaginatedUsersResponse,
            Course,
            CourseWithTeacher,
            CourseStudent,
            CreateCourseDto,
            UpdateCourseDto,
            SetGradeDto,
            AdminEnrollDto,
            PaginatedCoursesResponse,
            Enrollment,
            EnrollmentWithCourse,
            BookCategory,
            CreateCategoryDto,
            Book,
            CreateBookDto,
            UpdateBookDto,
            PaginatedBooksResponse,
            CardStatus,
            LibraryCard,
            UpdateCardStatusDto,
            IssueStatus,
            BookIssue,
            IssueWithDetails,
            CheckoutDto,
            PaymentMode,
            PayFineDto,
            FinePayment,
            FineSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness checks"),
        (name = "Authentication", description = "Signup and login"),
        (name = "Users", description = "Self-service profile endpoints"),
        (name = "Admin Users", description = "User administration"),
        (name = "Courses", description = "Course catalogue and grading"),
        (name = "Admin Courses", description = "Course administration"),
        (name = "Enrollments", description = "Student enrollments"),
        (name = "Library", description = "Catalogue, cards, circulation and fines")
    ),
    info(
        title = "SchoolHub API",
        version = "0.1.0",
        description = "School management backend: accounts, courses, enrollments and library circulation.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_library_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/library/circulation/checkout"));
        assert!(doc.paths.paths.contains_key("/api/admin/users/{id}/suspend"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
