//! Rate limiting for the authentication endpoints.
//!
//! - `RATE_LIMIT_AUTH_PER_SECOND`: tokens replenished per second (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size (default: 5)
//!
//! Limits are tracked per client key by a `governor` keyed limiter. A zero
//! in either variable falls back to the default.

use std::num::NonZeroU32;

use governor::Quota;

use crate::{env_var, parse_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub auth_per_second: u32,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_source(env_var)
    }

    pub fn from_source<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let per_second = parse_or(&lookup, "RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second);
        let burst = parse_or(&lookup, "RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size);

        Self {
            auth_per_second: if per_second == 0 {
                defaults.auth_per_second
            } else {
                per_second
            },
            auth_burst_size: if burst == 0 {
                defaults.auth_burst_size
            } else {
                burst
            },
        }
    }

    /// Quota for the keyed limiter guarding `/api/auth`.
    #[must_use]
    pub fn auth_quota(&self) -> Quota {
        let per_second = NonZeroU32::new(self.auth_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.auth_burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(per_second).allow_burst(burst)
    }
}
