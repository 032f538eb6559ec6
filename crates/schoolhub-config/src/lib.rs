//! # SchoolHub Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret, lifetime and issuer
//! - [`database`]: PostgreSQL connection and pool settings
//! - [`cors`]: allowed browser origins
//! - [`rate_limit`]: limits for the authentication endpoints
//! - [`library`]: loan period, fines and card defaults
//! - [`server`]: bind address
//!
//! Every struct exposes `from_env()`. The loading logic itself lives in a
//! `from_source` constructor that takes a lookup function, so it can be
//! exercised without touching the process environment.

pub mod cors;
pub mod database;
pub mod jwt;
pub mod library;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use library::LibraryConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub(crate) fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let owned: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| {
        owned
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}
