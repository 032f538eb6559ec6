//! PostgreSQL connection settings.
//!
//! `DATABASE_URL` is used verbatim when set. Otherwise the URL is assembled
//! from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and
//! `DB_SSLMODE` (default `disable`).
//!
//! Pool sizing:
//!
//! - `DB_MAX_CONNECTIONS` (default: 100)
//! - `DB_MIN_CONNECTIONS` (default: 10)
//! - `DB_ACQUIRE_TIMEOUT` seconds (default: 30)
//!
//! Connections are recycled after one hour.

use std::time::Duration;

use crate::{ConfigError, env_var, parse_or};

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// # Panics
    ///
    /// Panics when neither `DATABASE_URL` nor the `DB_*` variables are set.
    pub fn from_env() -> Self {
        Self::from_source(env_var)
            .expect("DATABASE_URL or DB_HOST/DB_PORT/DB_USER/DB_NAME must be set")
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = lookup("DB_HOST").ok_or(ConfigError::Missing("DB_HOST"))?;
                let port = lookup("DB_PORT").ok_or(ConfigError::Missing("DB_PORT"))?;
                let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
                let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
                let password = lookup("DB_PASSWORD").unwrap_or_default();
                let sslmode = lookup("DB_SSLMODE").unwrap_or_else(|| "disable".to_string());
                connection_url(&host, &port, &user, &password, &name, &sslmode)
            }
        };

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 100u32).max(1);
        let min_connections = parse_or(&lookup, "DB_MIN_CONNECTIONS", 10u32).min(max_connections);

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT", 30)),
            max_lifetime: Duration::from_secs(60 * 60),
        })
    }
}

pub fn connection_url(
    host: &str,
    port: &str,
    user: &str,
    password: &str,
    name: &str,
    sslmode: &str,
) -> String {
    let credentials = if password.is_empty() {
        encode_component(user)
    } else {
        format!("{}:{}", encode_component(user), encode_component(password))
    };

    format!(
        "postgres://{}@{}:{}/{}?sslmode={}",
        credentials, host, port, name, sslmode
    )
}

/// Percent-encodes everything outside the URL unreserved set.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
