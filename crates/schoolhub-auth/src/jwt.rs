//! Access token creation and verification.
//!
//! Tokens are HS256 signed with `JwtConfig::secret`. Verification checks the
//! signature, `exp`, `nbf` and that `iss` matches `JwtConfig::issuer`.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use schoolhub_config::JwtConfig;
use schoolhub_core::AppError;

use crate::claims::Claims;
use crate::roles::UserRole;

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        iss: jwt_config.issuer.clone(),
        exp,
        iat: now,
        nbf: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Any failure is a 401 "Invalid or expired token".
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[jwt_config.issuer.as_str()]);
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            issuer: "school-management-system".to_string(),
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_at(now: usize) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@school.edu".to_string(),
            role: UserRole::Student,
            iss: "school-management-system".to_string(),
            exp: now + 3600,
            iat: now,
            nbf: now,
        }
    }

    #[test]
    fn test_create_and_verify_token() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, "ada@school.edu", UserRole::Teacher, &config)
            .unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "ada@school.edu");
        assert_eq!(claims.role, UserRole::Teacher);
        assert_eq!(claims.iss, "school-management-system");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn test_verify_token_invalid() {
        let err = verify_token("invalid-token", &get_test_jwt_config()).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.error.to_string(), "Invalid or expired token");
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token =
            create_access_token(Uuid::new_v4(), "a@school.edu", UserRole::Admin, &config).unwrap();

        let wrong_config = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        };

        assert!(verify_token(&token, &wrong_config).is_err());
    }

    #[test]
    fn test_verify_token_wrong_issuer() {
        let config = get_test_jwt_config();
        let token =
            create_access_token(Uuid::new_v4(), "a@school.edu", UserRole::Admin, &config).unwrap();

        let other_issuer = JwtConfig {
            issuer: "another-system".to_string(),
            ..get_test_jwt_config()
        };

        assert!(verify_token(&token, &other_issuer).is_err());
    }

    #[test]
    fn test_verify_token_expired() {
        let config = get_test_jwt_config();
        let now = Utc::now().timestamp() as usize;
        let mut claims = claims_at(now - 7200);
        claims.exp = now - 3600;

        let token = sign(&claims, &config.secret);
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_verify_token_not_yet_valid() {
        let config = get_test_jwt_config();
        let now = Utc::now().timestamp() as usize;
        let mut claims = claims_at(now);
        claims.nbf = now + 3600;
        claims.exp = now + 7200;

        let token = sign(&claims, &config.secret);
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_verify_token_rejects_other_algorithm() {
        let config = get_test_jwt_config();
        let claims = claims_at(Utc::now().timestamp() as usize);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config).is_err());
    }
}
