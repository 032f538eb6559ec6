use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode};
use schoolhub::middleware::auth::AuthUser;
use schoolhub::middleware::role::{RequireAdmin, RequireStaff, check_self_or_staff};
use schoolhub::state::AppState;
use schoolhub_auth::{Claims, UserRole, create_access_token};
use schoolhub_config::{CorsConfig, JwtConfig, LibraryConfig, RateLimitConfig};
use sqlx::PgPool;
use uuid::Uuid;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "role-middleware-test-secret".to_string(),
        access_token_expiry: 3600,
        issuer: "school-management-system".to_string(),
    }
}

/// The extractors never touch the database, so a lazy pool is enough.
fn state() -> AppState {
    AppState::new(
        PgPool::connect_lazy("postgres://localhost/unused").unwrap(),
        jwt_config(),
        CorsConfig {
            allowed_origins: vec![],
        },
        RateLimitConfig::default(),
        LibraryConfig::default(),
    )
}

fn auth_user(id: Uuid, role: UserRole) -> AuthUser {
    AuthUser(Claims {
        sub: id.to_string(),
        email: "test@example.com".to_string(),
        role,
        iss: "school-management-system".to_string(),
        exp: 9999999999,
        iat: 1234567890,
        nbf: 1234567890,
    })
}

fn parts_with_role(role: UserRole) -> axum::http::request::Parts {
    let token = create_access_token(Uuid::new_v4(), "x@example.com", role, &jwt_config()).unwrap();
    let (parts, _) = Request::builder()
        .uri("/api/library/books")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
        .into_parts();
    parts
}

#[tokio::test]
async fn test_require_staff_admits_admin_and_teacher() {
    let state = state();

    for role in [UserRole::Admin, UserRole::Teacher] {
        let mut parts = parts_with_role(role);
        let RequireStaff(user) = RequireStaff::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.role(), role);
    }
}

#[tokio::test]
async fn test_require_staff_rejects_students_and_parents() {
    let state = state();

    for role in [UserRole::Student, UserRole::Parent] {
        let mut parts = parts_with_role(role);
        let err = RequireStaff::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.error.to_string(), "Forbidden - staff access required");
    }
}

#[tokio::test]
async fn test_require_admin_rejects_teacher() {
    let state = state();

    let mut parts = parts_with_role(UserRole::Admin);
    assert!(RequireAdmin::from_request_parts(&mut parts, &state).await.is_ok());

    let mut parts = parts_with_role(UserRole::Teacher);
    let err = RequireAdmin::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.error.to_string(), "Forbidden - admin access required");
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let state = state();
    let (mut parts, _) = Request::builder()
        .uri("/api/library/books")
        .body(Body::empty())
        .unwrap()
        .into_parts();

    let err = RequireStaff::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_self_or_staff() {
    let owner = Uuid::new_v4();

    assert!(check_self_or_staff(&auth_user(owner, UserRole::Student), owner).is_ok());
    assert!(check_self_or_staff(&auth_user(Uuid::new_v4(), UserRole::Teacher), owner).is_ok());
    assert!(check_self_or_staff(&auth_user(Uuid::new_v4(), UserRole::Admin), owner).is_ok());
    assert!(check_self_or_staff(&auth_user(Uuid::new_v4(), UserRole::Student), owner).is_err());
    assert!(check_self_or_staff(&auth_user(Uuid::new_v4(), UserRole::Parent), owner).is_err());
}
