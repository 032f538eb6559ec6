//! SchoolHub observability.
//!
//! - Tracing subscriber with console, rolling error log and rolling JSON log
//! - HTTP request logging middleware
//! - Prometheus metrics: HTTP middleware plus business counters
//!
//! Everything except console logging can be switched off at runtime with
//! `OBSERVABILITY_ENABLED=false` (or `0`).
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() {
//!     schoolhub_observability::init_tracing();
//!     let handle = schoolhub_observability::init_metrics();
//!     // ... build router, serve ...
//! }
//! ```

pub mod logging;
pub mod metrics;

use std::sync::OnceLock;

pub use metrics_exporter_prometheus::PrometheusHandle;

pub use self::logging::{init_tracing, logging_middleware};
pub use self::metrics::{
    init_metrics, metrics_app, metrics_middleware, track_book_checked_out, track_book_returned,
    track_enrollment_created, track_fine_paid, track_jwt_issued, track_user_created,
    track_user_login_failure, track_user_login_success,
};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Enabled unless `OBSERVABILITY_ENABLED` is `false` or `0`. Read once.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| parse_enabled(&v))
            .unwrap_or(true)
    })
}

fn parse_enabled(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value != "false" && value != "0"
}

#[cfg(test)]
mod tests {
    use super::parse_enabled;

    #[test]
    fn test_parse_enabled() {
        assert!(parse_enabled("true"));
        assert!(parse_enabled("1"));
        assert!(parse_enabled(""));
        assert!(!parse_enabled("false"));
        assert!(!parse_enabled(" FALSE "));
        assert!(!parse_enabled("0"));
    }
}
