use crate::{ConfigError, env_var, parse_or};

pub const DEFAULT_ISSUER: &str = "school-management-system";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub access_token_expiry: i64,
    pub issuer: String,
}

impl JwtConfig {
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is not set. There is no usable default for a
    /// signing key.
    pub fn from_env() -> Self {
        Self::from_source(env_var).expect("JWT_SECRET must be set")
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            secret,
            access_token_expiry: parse_or(&lookup, "JWT_ACCESS_EXPIRY", 86400), // 24 hours
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
        })
    }
}
