pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod library;
pub mod users;
