use schoolhub_config::{CorsConfig, JwtConfig, LibraryConfig, RateLimitConfig};
use sqlx::PgPool;

use crate::middleware::rate_limit::AuthRateLimiter;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub library_config: LibraryConfig,
    pub auth_limiter: AuthRateLimiter,
}

impl AppState {
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
        library_config: LibraryConfig,
    ) -> Self {
        let auth_limiter = AuthRateLimiter::new(&rate_limit_config);
        Self {
            db,
            jwt_config,
            cors_config,
            rate_limit_config,
            library_config,
            auth_limiter,
        }
    }
}

/// Builds the state from environment configuration around an existing pool.
///
/// # Panics
///
/// Panics when `JWT_SECRET` is unset.
pub fn init_app_state(db: PgPool) -> AppState {
    AppState::new(
        db,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        RateLimitConfig::from_env(),
        LibraryConfig::from_env(),
    )
}
