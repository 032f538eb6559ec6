use axum::body::Body;
use axum::http::{Request, StatusCode};
use schoolhub_config::RateLimitConfig;
use serde_json::json;
use sqlx::PgPool;

mod common;
use common::{send, setup_test_app_with_rate_limit};

fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        auth_per_second: 1,
        auth_burst_size: 3,
    }
}

fn login_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(
            json!({ "email": "nobody@example.com", "password": "whatever123" }).to_string(),
        ))
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_auth_rate_limit_rejects_after_burst(pool: PgPool) {
    let app = setup_test_app_with_rate_limit(pool, strict_rate_limit_config());

    for _ in 0..3 {
        let (status, _) = send(&app, login_from("198.51.100.1")).await;
        // Processed, not limited
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = send(&app, login_from("198.51.100.1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too many requests, please try again later");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_auth_rate_limit_is_per_client(pool: PgPool) {
    let app = setup_test_app_with_rate_limit(pool, strict_rate_limit_config());

    for _ in 0..4 {
        send(&app, login_from("198.51.100.2")).await;
    }

    let (status, _) = send(&app, login_from("198.51.100.3")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rate_limit_only_applies_to_auth(pool: PgPool) {
    let app = setup_test_app_with_rate_limit(pool, strict_rate_limit_config());

    for _ in 0..5 {
        let request = Request::builder()
            .uri("/health")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
    }
}
