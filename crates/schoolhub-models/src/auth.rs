//! Signup and login payloads.

use schoolhub_auth::UserRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::User;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "student@school.edu")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    #[schema(example = "password123")]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    /// One of `teacher`, `student`, `parent`. Defaults to `student`.
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_valid_without_role() {
        let request: SignupRequest = serde_json::from_str(
            r#"{"email":"s@school.edu","password":"password123","first_name":"S","last_name":"T"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.role.is_none());
    }

    #[test]
    fn test_signup_invalid_email() {
        let request = SignupRequest {
            email: "nope".to_string(),
            password: "password123".to_string(),
            first_name: "S".to_string(),
            last_name: "T".to_string(),
            role: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_signup_unknown_role_fails_to_parse() {
        let result: Result<SignupRequest, _> = serde_json::from_str(
            r#"{"email":"s@school.edu","password":"password123","first_name":"S","last_name":"T","role":"janitor"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_login_empty_password() {
        let request = LoginRequest {
            email: "s@school.edu".to_string(),
            password: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
