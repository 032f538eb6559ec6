use fake::Fake;
use fake::faker::lorem::en::Sentence;
use sqlx::PgPool;
use uuid::Uuid;

use super::SEED_COURSE_PREFIX;
use super::models::CourseSeed;

const SUBJECTS: &[&str] = &[
    "Algebra",
    "Biology",
    "Chemistry",
    "Geography",
    "History",
    "Literature",
    "Physics",
    "Computer Science",
    "Music",
    "Art",
];

/// Courses are assigned to teachers round-robin.
pub fn generate_courses(count: usize, teacher_ids: &[Uuid]) -> Vec<CourseSeed> {
    (0..count)
        .map(|idx| {
            let subject = SUBJECTS[idx % SUBJECTS.len()];
            let level = idx / SUBJECTS.len() + 1;
            CourseSeed {
                name: format!("{} {}", subject, level),
                code: format!("{}{:04}", SEED_COURSE_PREFIX, idx + 1),
                description: Sentence(6..12).fake(),
                teacher_id: if teacher_ids.is_empty() {
                    None
                } else {
                    Some(teacher_ids[idx % teacher_ids.len()])
                },
            }
        })
        .collect()
}

pub async fn insert_courses(
    db: &PgPool,
    courses: &[CourseSeed],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(courses.len());

    for course in courses {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO courses (name, code, description, teacher_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (code) DO NOTHING
             RETURNING id",
        )
        .bind(&course.name)
        .bind(&course.code)
        .bind(&course.description)
        .bind(course.teacher_id)
        .fetch_optional(&mut *tx)
        .await?;
        ids.extend(id);
    }

    tx.commit().await?;
    Ok(ids)
}

/// Each student joins up to three courses.
pub async fn enroll_students(
    db: &PgPool,
    course_ids: &[Uuid],
    student_ids: &[Uuid],
) -> Result<u64, sqlx::Error> {
    if course_ids.is_empty() {
        return Ok(0);
    }

    let mut tx = db.begin().await?;
    let mut enrolled = 0;

    for (idx, student_id) in student_ids.iter().enumerate() {
        for offset in 0..course_ids.len().min(3) {
            let course_id = course_ids[(idx + offset) % course_ids.len()];
            enrolled += sqlx::query(
                "INSERT INTO enrollments (course_id, student_id) VALUES ($1, $2)
                 ON CONFLICT (course_id, student_id) DO NOTHING",
            )
            .bind(course_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
    }

    tx.commit().await?;
    Ok(enrolled)
}

pub async fn clear_courses(db: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE code LIKE $1")
        .bind(format!("{}%", SEED_COURSE_PREFIX))
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
