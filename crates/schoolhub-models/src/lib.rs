//! # SchoolHub Models
//!
//! Database entities and request/response DTOs.
//!
//! - [`auth`]: signup and login payloads
//! - [`users`]: accounts, profile updates, admin user management
//! - [`courses`]: courses and course rosters
//! - [`enrollments`]: student enrollments
//! - [`library`]: categories, books, cards, circulation and fines
//!
//! Entities derive `sqlx::FromRow` and are selected with explicit column
//! lists. Password hashes only ever appear on [`users::UserCredentials`],
//! which is not serializable.

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod library;
pub mod users;

pub use auth::{LoginRequest, LoginResponse, MessageResponse, SignupRequest, SignupResponse};
pub use courses::{
    AdminEnrollDto, Course, CourseFilterParams, CourseStudent, CourseWithTeacher, CreateCourseDto,
    PaginatedCoursesResponse, SetGradeDto, UpdateCourseDto,
};
pub use enrollments::{Enrollment, EnrollmentWithCourse};
pub use library::{
    Book, BookCategory, BookFilterParams, BookIssue, CardStatus, CheckoutDto, CreateBookDto,
    CreateCategoryDto, FinePayment, FineSummary, IssueCardParams, IssueStatus, IssueWithDetails,
    LibraryCard, PaginatedBooksResponse, PayFineDto, PaymentMode, UpdateBookDto,
    UpdateCardStatusDto,
};
pub use users::{
    ChangePasswordDto, CreateUserDto, PaginatedUsersResponse, UpdateProfileDto, UpdateUserDto,
    User, UserCredentials, UserFilterParams, UserSummary,
};

pub use schoolhub_auth::{Claims, UserRole};
