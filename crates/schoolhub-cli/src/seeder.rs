//! Fake data for development databases.
//!
//! Seeded rows are recognisable so `clear-seed` can remove them without
//! touching real data: users have `@example.com` emails, courses use the
//! `SEED-` code prefix and books the `SEED` ISBN prefix.

pub mod books;
pub mod courses;
pub mod models;
pub mod users;

use schoolhub_auth::UserRole;
use sqlx::PgPool;
use std::time::Instant;

pub use models::SeedConfig;

pub const SEED_EMAIL_DOMAIN: &str = "example.com";
pub const SEED_COURSE_PREFIX: &str = "SEED-";
pub const SEED_ISBN_PREFIX: &str = "SEED";

pub async fn seed_all(db: &PgPool, config: &SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    println!("🌱 Starting database seeding...");
    println!(
        "   - {} teachers, {} students, {} courses, {} books",
        config.teachers, config.students, config.courses, config.books
    );

    println!("\n🔐 Hashing seed passwords...");
    let hashes = users::hash_role_passwords(&[UserRole::Teacher, UserRole::Student])?;
    let hash_for = |role: UserRole| {
        hashes
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, h)| h.clone())
            .unwrap_or_default()
    };

    println!("\n👥 Seeding users...");
    let teachers = users::generate_users(
        config.teachers,
        UserRole::Teacher,
        &hash_for(UserRole::Teacher),
    );
    let teacher_ids = users::insert_users_batch(db, &teachers).await?;
    let students = users::generate_users(
        config.students,
        UserRole::Student,
        &hash_for(UserRole::Student),
    );
    let student_ids = users::insert_users_batch(db, &students).await?;

    println!("\n📘 Seeding courses...");
    let course_seeds = courses::generate_courses(config.courses, &teacher_ids);
    let course_ids = courses::insert_courses(db, &course_seeds).await?;
    let enrolled = courses::enroll_students(db, &course_ids, &student_ids).await?;
    println!(
        "   ✓ Inserted {} courses and {} enrollments",
        course_ids.len(),
        enrolled
    );

    println!("\n📚 Seeding library...");
    let book_seeds = books::generate_books(config.books);
    let inserted = books::insert_books(db, &book_seeds).await?;
    println!("   ✓ Inserted {} books", inserted);

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!(
        "   Teachers sign in with '{}', students with '{}'",
        users::seed_password(UserRole::Teacher),
        users::seed_password(UserRole::Student)
    );

    Ok(())
}

/// Users go first so their loans cascade away before the books are removed.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let users = users::clear_users(db).await?;
    let courses = courses::clear_courses(db).await?;
    let books = books::clear_books(db).await?;

    println!(
        "   ✓ Deleted {} users, {} courses, {} books in {:?}",
        users,
        courses,
        books,
        start_time.elapsed()
    );
    Ok(())
}
