//! # SchoolHub Auth
//!
//! Authentication types and JWT utilities for the SchoolHub API.
//!
//! - [`roles`]: the [`UserRole`] enum shared by tokens and the `users` table
//! - [`claims`]: access token claims
//! - [`jwt`]: token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_auth::{UserRole, create_access_token, verify_token};
//! use schoolhub_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "ada@school.edu", UserRole::Teacher, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, UserRole::Teacher);
//! ```

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use roles::UserRole;
