//! HTTP endpoints for pair-relay.
//!
//! Provides health checks and Prometheus metrics.

pub mod health;
mod metrics;

use crate::server::ChatRelay;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;

pub use health::{init_start_time, HealthStatus};

/// Build the HTTP router with all endpoints.
///
/// `/metrics` is only mounted when `http.metrics_enabled` is set.
pub fn build_router(relay: Arc<ChatRelay>) -> Router {
    let mut router = Router::new().route("/health", get(health::health_handler));
    if relay.config().http.metrics_enabled {
        router = router.route("/metrics", get(metrics::metrics_handler));
    }
    router.layer(Extension(relay))
}
