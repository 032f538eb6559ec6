pub use schoolhub_models::enrollments::{Enrollment, EnrollmentWithCourse};
