//! # SchoolHub CLI
//!
//! Administrative commands and fake-data seeding for development.
//!
//! ```ignore
//! use schoolhub_cli::seeder::{SeedConfig, seed_all};
//!
//! let config = SeedConfig { teachers: 5, students: 50, courses: 8, books: 40 };
//! seed_all(&pool, &config).await?;
//! ```

pub mod admin;
pub mod seeder;
