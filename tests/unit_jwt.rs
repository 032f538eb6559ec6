use schoolhub_auth::{UserRole, create_access_token, verify_token};
use schoolhub_config::JwtConfig;
use uuid::Uuid;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
        issuer: "school-management-system".to_string(),
    }
}

#[test]
fn test_token_round_trip_keeps_claims() {
    let config = jwt_config();
    let user_id = Uuid::new_v4();

    let token = create_access_token(user_id, "teacher@school.edu", UserRole::Teacher, &config)
        .unwrap();
    let claims = verify_token(&token, &config).unwrap();

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email, "teacher@school.edu");
    assert_eq!(claims.role, UserRole::Teacher);
    assert_eq!(claims.iss, "school-management-system");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_wrong_secret_rejected() {
    let token =
        create_access_token(Uuid::new_v4(), "a@b.com", UserRole::Student, &jwt_config()).unwrap();

    let other = JwtConfig {
        secret: "a-different-secret".to_string(),
        ..jwt_config()
    };

    let err = verify_token(&token, &other).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(err.error.to_string(), "Invalid or expired token");
}

#[test]
fn test_wrong_issuer_rejected() {
    let token =
        create_access_token(Uuid::new_v4(), "a@b.com", UserRole::Parent, &jwt_config()).unwrap();

    let other = JwtConfig {
        issuer: "someone-else".to_string(),
        ..jwt_config()
    };

    assert!(verify_token(&token, &other).is_err());
}

#[test]
fn test_negative_lifetime_clamps_to_zero() {
    let config = JwtConfig {
        access_token_expiry: -3600,
        ..jwt_config()
    };

    let token = create_access_token(Uuid::new_v4(), "a@b.com", UserRole::Admin, &config).unwrap();
    let claims = verify_token(&token, &config).unwrap();

    assert_eq!(claims.exp, claims.iat);
}

#[test]
fn test_malformed_token_rejected() {
    assert!(verify_token("not.a.token", &jwt_config()).is_err());
    assert!(verify_token("", &jwt_config()).is_err());
}
