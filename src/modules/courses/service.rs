use schoolhub_auth::UserRole;
use schoolhub_core::{AppError, PaginationMeta};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::model::{
    Course, CourseFilterParams, CourseStudent, CourseWithTeacher, CreateCourseDto,
    PaginatedCoursesResponse, UpdateCourseDto,
};
use crate::modules::enrollments::model::Enrollment;
use crate::modules::users::service::UserService;

const COURSE_COLUMNS: &str = "id, name, code, description, teacher_id, created_at, updated_at";

const COURSE_WITH_TEACHER_SELECT: &str = "SELECT c.id, c.name, c.code, c.description, c.teacher_id,
        CASE WHEN u.id IS NULL THEN NULL ELSE u.first_name || ' ' || u.last_name END AS teacher_name,
        (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS student_count,
        c.created_at, c.updated_at
     FROM courses c
     LEFT JOIN users u ON u.id = c.teacher_id";

fn code_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::conflict(anyhow::anyhow!("Course code already exists"));
    }
    error!(error = %e, "Database error writing course");
    AppError::from(e)
}

fn course_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Course not found"))
}

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "courses"))]
    pub async fn list_courses(
        db: &PgPool,
        filters: CourseFilterParams,
    ) -> Result<PaginatedCoursesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let (where_clause, teacher_id) = match filters.teacher_id {
            Some(id) => (" WHERE c.teacher_id = $1", Some(id)),
            None => ("", None),
        };

        let count_query = format!("SELECT COUNT(*) FROM courses c{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(id) = teacher_id {
            count_sql = count_sql.bind(id);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{}{} ORDER BY c.code ASC LIMIT {} OFFSET {}",
            COURSE_WITH_TEACHER_SELECT, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, CourseWithTeacher>(&data_query);
        if let Some(id) = teacher_id {
            data_sql = data_sql.bind(id);
        }
        let courses = data_sql.fetch_all(db).await?;

        debug!(total, returned = courses.len(), "Courses fetched");

        Ok(PaginatedCoursesResponse {
            data: courses,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "courses"))]
    pub async fn get_course(db: &PgPool, course_id: Uuid) -> Result<CourseWithTeacher, AppError> {
        sqlx::query_as::<_, CourseWithTeacher>(&format!(
            "{} WHERE c.id = $1",
            COURSE_WITH_TEACHER_SELECT
        ))
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(course_not_found)
    }

    async fn find_course(db: &PgPool, course_id: Uuid) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(course_not_found)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "enrollments"))]
    pub async fn get_course_students(
        db: &PgPool,
        course_id: Uuid,
    ) -> Result<Vec<CourseStudent>, AppError> {
        Self::find_course(db, course_id).await?;

        let students = sqlx::query_as::<_, CourseStudent>(
            "SELECT e.id AS enrollment_id, u.id AS student_id, u.first_name, u.last_name, u.email,
                    e.grade, e.created_at AS enrolled_at
             FROM enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.course_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(course_id)
        .fetch_all(db)
        .await?;

        Ok(students)
    }

    /// Only the course's own teacher, or an admin, may grade.
    #[instrument(skip(db, grade), fields(db.operation = "UPDATE", db.table = "enrollments"))]
    pub async fn set_grade(
        db: &PgPool,
        actor_id: Uuid,
        actor_role: UserRole,
        course_id: Uuid,
        enrollment_id: Uuid,
        grade: &str,
    ) -> Result<Enrollment, AppError> {
        let course = Self::find_course(db, course_id).await?;

        if actor_role != UserRole::Admin && course.teacher_id != Some(actor_id) {
            warn!(actor.id = %actor_id, course.id = %course_id, "Grade change by non-owner rejected");
            return Err(AppError::forbidden(
                "Only the course teacher or an admin can set grades".to_string(),
            ));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments SET grade = $3, updated_at = NOW()
             WHERE id = $1 AND course_id = $2
             RETURNING id, course_id, student_id, grade, created_at, updated_at",
        )
        .bind(enrollment_id)
        .bind(course_id)
        .bind(grade.trim())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Enrollment not found")))?;

        info!(enrollment.id = %enrollment_id, "Grade set");
        Ok(enrollment)
    }

    async fn validate_teacher(db: &PgPool, teacher_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(teacher_id) = teacher_id {
            UserService::require_role(db, teacher_id, UserRole::Teacher).await?;
        }
        Ok(())
    }

    #[instrument(skip(db, dto), fields(course.code = %dto.code, db.operation = "INSERT", db.table = "courses"))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        Self::validate_teacher(db, dto.teacher_id).await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (name, code, description, teacher_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(dto.code.trim())
        .bind(&dto.description)
        .bind(dto.teacher_id)
        .fetch_one(db)
        .await
        .map_err(code_conflict)?;

        info!(course.id = %course.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "courses"))]
    pub async fn update_course(
        db: &PgPool,
        course_id: Uuid,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        Self::validate_teacher(db, dto.teacher_id).await?;

        sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                description = COALESCE($4, description),
                teacher_id = COALESCE($5, teacher_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.code.as_deref().map(str::trim))
        .bind(dto.description)
        .bind(dto.teacher_id)
        .fetch_optional(db)
        .await
        .map_err(code_conflict)?
        .ok_or_else(course_not_found)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "courses"))]
    pub async fn delete_course(db: &PgPool, course_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(course_not_found());
        }

        info!(course.id = %course_id, "Course deleted");
        Ok(())
    }
}
