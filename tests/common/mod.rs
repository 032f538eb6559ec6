#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use schoolhub::router::init_router;
use schoolhub::state::AppState;
use schoolhub_auth::{UserRole, create_access_token};
use schoolhub_config::jwt::DEFAULT_ISSUER;
use schoolhub_config::{CorsConfig, JwtConfig, LibraryConfig, RateLimitConfig};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key-for-integration-tests".to_string(),
        access_token_expiry: 3600,
        issuer: DEFAULT_ISSUER.to_string(),
    }
}

/// Generous enough that ordinary tests never trip the auth limiter.
pub fn relaxed_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        auth_per_second: 1000,
        auth_burst_size: 1000,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    test_state_with_rate_limit(pool, relaxed_rate_limit_config())
}

pub fn test_state_with_rate_limit(pool: PgPool, rate_limit: RateLimitConfig) -> AppState {
    AppState::new(
        pool,
        test_jwt_config(),
        CorsConfig {
            allowed_origins: vec![],
        },
        rate_limit,
        LibraryConfig::default(),
    )
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

pub fn setup_test_app_with_rate_limit(pool: PgPool, rate_limit: RateLimitConfig) -> Router {
    init_router(test_state_with_rate_limit(pool, rate_limit))
}

pub fn generate_unique_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4())
}

/// Inserts a user directly. bcrypt cost 4 keeps the suite fast.
pub async fn create_test_user(pool: &PgPool, role: UserRole) -> TestUser {
    let email = generate_unique_email();
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, first_name, last_name, role)
         VALUES ($1, $2, 'Test', $3, $4)
         RETURNING id",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: TEST_PASSWORD.to_string(),
        role,
    }
}

pub fn token_for(user: &TestUser) -> String {
    create_access_token(user.id, &user.email, user.role, &test_jwt_config()).unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends the request and returns the status with the parsed body
/// (`Value::Null` when the body is empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

pub async fn create_course(
    app: &Router,
    admin: &TestUser,
    code: &str,
    teacher_id: Option<Uuid>,
) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/admin/courses",
            Some(&token_for(admin)),
            Some(serde_json::json!({
                "name": format!("Course {}", code),
                "code": code,
                "description": "Integration test course",
                "teacher_id": teacher_id,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create course failed: {}", body);
    body
}

pub async fn create_book(app: &Router, staff: &TestUser, isbn: &str, copies: i32) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/library/books",
            Some(&token_for(staff)),
            Some(serde_json::json!({
                "isbn": isbn,
                "title": "The Hobbit",
                "author": "J. R. R. Tolkien",
                "total_copies": copies,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create book failed: {}", body);
    body
}

pub async fn issue_card(app: &Router, staff: &TestUser, user_id: Uuid) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            &format!("/api/library/cards/{}", user_id),
            Some(&token_for(staff)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "issue card failed: {}", body);
    body
}
