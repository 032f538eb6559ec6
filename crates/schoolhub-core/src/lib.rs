//! # SchoolHub Core
//!
//! Core types, errors, and utilities for the SchoolHub API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Query parameters and metadata for paginated listings
//! - [`password`]: bcrypt password hashing, verification and strength policy
//! - [`search`]: escaped `ILIKE` patterns for substring filters
//! - [`serde`]: query-string deserializers that treat empty values as absent
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("correct horse battery")?;
//! if !verify_password("correct horse battery", &hash)? {
//!     return Err(AppError::unauthorized("Invalid email or password".to_string()));
//! }
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod search;
pub mod serde;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
pub use search::contains_pattern;
pub use password::{
    hash_password, hash_password_async, validate_password_strength, verify_password,
    verify_password_async,
};
