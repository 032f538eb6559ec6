//! Courses and their rosters.

use chrono::{DateTime, Utc};
use schoolhub_core::serde::deserialize_optional_uuid;
use schoolhub_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course joined with the assigned teacher's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseWithTeacher {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub teacher_name: Option<String>,
    pub student_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of a course roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseStudent {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 255, message = "Course name is required"))]
    #[schema(example = "Introduction to Algebra")]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Course code is required"))]
    #[schema(example = "MATH101")]
    pub code: String,
    pub description: Option<String>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 255, message = "Course name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Course code cannot be empty"))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetGradeDto {
    #[validate(length(min = 1, max = 10, message = "Grade must be 1-10 characters"))]
    #[schema(example = "A-")]
    pub grade: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminEnrollDto {
    pub student_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CourseFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub teacher_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub data: Vec<CourseWithTeacher>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_course_requires_code() {
        let dto = CreateCourseDto {
            name: "Biology".to_string(),
            code: String::new(),
            description: None,
            teacher_id: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_grade_length() {
        assert!(SetGradeDto { grade: "B+".to_string() }.validate().is_ok());
        assert!(SetGradeDto { grade: String::new() }.validate().is_err());
        assert!(
            SetGradeDto {
                grade: "excellent work".to_string()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_filter_ignores_empty_teacher() {
        let params: CourseFilterParams = serde_json::from_str(r#"{"teacher_id":""}"#).unwrap();
        assert!(params.teacher_id.is_none());
    }
}
