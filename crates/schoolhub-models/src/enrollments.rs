use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student's enrollment joined with course details.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EnrollmentWithCourse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_name: String,
    pub course_code: String,
    pub teacher_name: Option<String>,
    pub grade: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}
