use schoolhub_auth::UserRole;
use schoolhub_core::AppError;
use schoolhub_observability as observability;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::model::{Enrollment, EnrollmentWithCourse};
use crate::modules::users::service::UserService;

const ENROLLMENT_COLUMNS: &str = "id, course_id, student_id, grade, created_at, updated_at";

pub struct EnrollmentService;

impl EnrollmentService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "enrollments"))]
    pub async fn list_for_student(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<EnrollmentWithCourse>, AppError> {
        let enrollments = sqlx::query_as::<_, EnrollmentWithCourse>(
            "SELECT e.id, e.course_id, c.name AS course_name, c.code AS course_code,
                    CASE WHEN t.id IS NULL THEN NULL ELSE t.first_name || ' ' || t.last_name END AS teacher_name,
                    e.grade, e.created_at AS enrolled_at
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             LEFT JOIN users t ON t.id = c.teacher_id
             WHERE e.student_id = $1
             ORDER BY e.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(enrollments)
    }

    /// Inserts the enrollment. The caller is responsible for checking that
    /// `student_id` belongs to a student.
    #[instrument(skip(db), fields(db.operation = "INSERT", db.table = "enrollments"))]
    pub async fn enroll(
        db: &PgPool,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<Enrollment, AppError> {
        let course_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(db)
                .await?;

        if !course_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "INSERT INTO enrollments (course_id, student_id) VALUES ($1, $2) RETURNING {}",
            ENROLLMENT_COLUMNS
        ))
        .bind(course_id)
        .bind(student_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict(anyhow::anyhow!(
                    "Student is already enrolled in this course"
                ));
            }
            error!(error = %e, "Database error creating enrollment");
            AppError::from(e)
        })?;

        observability::track_enrollment_created();
        info!(enrollment.id = %enrollment.id, "Student enrolled");

        Ok(enrollment)
    }

    /// Admin path: the target must be an existing student.
    pub async fn enroll_student(
        db: &PgPool,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<Enrollment, AppError> {
        UserService::require_role(db, student_id, UserRole::Student).await?;
        Self::enroll(db, course_id, student_id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "enrollments"))]
    pub async fn unenroll_student(
        db: &PgPool,
        course_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM enrollments WHERE course_id = $1 AND student_id = $2")
                .bind(course_id)
                .bind(student_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Enrollment not found")));
        }

        info!(course.id = %course_id, student.id = %student_id, "Student unenrolled");
        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "enrollments"))]
    pub async fn withdraw(
        db: &PgPool,
        actor_id: Uuid,
        actor_role: UserRole,
        enrollment_id: Uuid,
    ) -> Result<(), AppError> {
        let owner: Uuid =
            sqlx::query_scalar("SELECT student_id FROM enrollments WHERE id = $1")
                .bind(enrollment_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Enrollment not found")))?;

        if actor_role != UserRole::Admin && owner != actor_id {
            warn!(actor.id = %actor_id, enrollment.id = %enrollment_id, "Withdrawal from another student's enrollment rejected");
            return Err(AppError::forbidden(
                "You can only withdraw from your own enrollments".to_string(),
            ));
        }

        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(enrollment_id)
            .execute(db)
            .await?;

        info!(enrollment.id = %enrollment_id, "Enrollment withdrawn");
        Ok(())
    }
}
