use schoolhub_auth::UserRole;
use uuid::Uuid;

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

pub struct CourseSeed {
    pub name: String,
    pub code: String,
    pub description: String,
    pub teacher_id: Option<Uuid>,
}

pub struct BookSeed {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub publication_year: i32,
    pub pages: i32,
    pub total_copies: i32,
    pub category: &'static str,
}

/// How much fake data `seed` creates.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    pub students: usize,
    pub courses: usize,
    pub books: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 5,
            students: 50,
            courses: 8,
            books: 40,
        }
    }
}
