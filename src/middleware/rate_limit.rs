//! Per-client rate limiting for `/api/auth`.
//!
//! Clients are keyed by the first `X-Forwarded-For` address, then by the
//! peer socket address, then by the literal `"unknown"`.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, RateLimiter};
use schoolhub_config::RateLimitConfig;
use schoolhub_core::AppError;
use tracing::warn;

use crate::state::AppState;

pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later";

#[derive(Clone)]
pub struct AuthRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl fmt::Debug for AuthRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRateLimiter")
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

impl AuthRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(config.auth_quota())),
        }
    }

    /// Consumes one token for `key`; `false` when the bucket is empty.
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Forgets clients whose buckets have refilled.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

pub fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let key = client_key(&req);

    if !state.auth_limiter.check(&key) {
        warn!(client = %key, path = %req.uri().path(), "Auth rate limit exceeded");
        return AppError::too_many_requests(TOO_MANY_REQUESTS.to_string()).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    fn request(forwarded_for: Option<&str>, peer: Option<SocketAddr>) -> Request {
        let mut builder = http::Request::builder().uri("/api/auth/login");
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(addr) = peer {
            req.extensions_mut().insert(ConnectInfo(addr));
        }
        req
    }

    #[test]
    fn test_forwarded_for_takes_first_address() {
        let req = request(Some("203.0.113.7, 10.0.0.1"), None);
        assert_eq!(client_key(&req), "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let peer: SocketAddr = "192.0.2.10:51234".parse().unwrap();
        assert_eq!(client_key(&request(None, Some(peer))), "192.0.2.10");
        assert_eq!(client_key(&request(Some(" "), Some(peer))), "192.0.2.10");
    }

    #[test]
    fn test_unknown_without_any_source() {
        assert_eq!(client_key(&request(None, None)), "unknown");
    }

    #[test]
    fn test_limiter_is_per_key() {
        let limiter = AuthRateLimiter::new(&RateLimitConfig {
            auth_per_second: 1,
            auth_burst_size: 2,
        });

        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }
}
