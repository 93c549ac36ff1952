//! AquaDesk Observability
//!
//! - Console logging (always available)
//! - Request logging middleware (always available)
//! - Rolling JSON log files and OpenTelemetry export (`observability` feature)
//! - Prometheus metrics, including credential-resolution counters
//!   (`observability` feature)
//!
//! With the feature compiled in, `OBSERVABILITY_ENABLED=false` still turns
//! the heavy layers off at runtime. Without it, the same functions exist as
//! no-ops so callers never need `cfg` attributes.
//!
//! ```no_run
//! use aquadesk_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
pub mod request_logging;

#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;
pub use request_logging::logging_middleware;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, is_observability_enabled, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, metrics_middleware, metrics_router, track_auth_resolution,
    track_strategy_failure,
};

/// Parses an `OBSERVABILITY_ENABLED`-style flag. Unset means enabled.
pub fn parse_enabled_flag(value: Option<&str>) -> bool {
    value
        .map(|v| {
            let v = v.trim().to_lowercase();
            v != "false" && v != "0"
        })
        .unwrap_or(true)
}

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Falls back to console logging.
    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    pub fn init_metrics() -> Option<()> {
        None
    }

    pub fn metrics_router(_handle: ()) -> Router {
        Router::new()
    }

    pub fn track_auth_resolution(_strategy: &str, _outcome: &str) {}
    pub fn track_strategy_failure(_strategy: &str, _reason: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
