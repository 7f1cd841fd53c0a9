//! Prometheus metrics endpoint.

use crate::server::ChatRelay;
use axum::{http::header::CONTENT_TYPE, response::IntoResponse, Extension};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Prometheus metrics handler.
///
/// Returns metrics in Prometheus text format.
/// Includes both gauges (current state) and counters (monotonic since startup).
pub async fn metrics_handler(Extension(relay): Extension<Arc<ChatRelay>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        render(&relay).await,
    )
}

async fn render(relay: &ChatRelay) -> String {
    let m = relay.metrics();

    // Gauges — current state
    let stats = relay.stats().await;
    let waiting = stats.waiting;
    let sessions = stats.sessions;
    let limiter_keys = relay.rate_limits().message_keys_count();

    // Counters — monotonic since startup
    let pairings = m.pairings_total.load(Ordering::Relaxed);
    let ended = m.sessions_ended_total.load(Ordering::Relaxed);
    let relayed = m.messages_relayed.load(Ordering::Relaxed);
    let bytes = m.bytes_relayed.load(Ordering::Relaxed);
    let failures = m.delivery_failures.load(Ordering::Relaxed);
    let rate_limits = m.rate_limit_hits.load(Ordering::Relaxed);
    let repairs = m.repairs_total.load(Ordering::Relaxed);

    format!(
        r#"# HELP blindpair_waiting_users Users waiting for a partner
# TYPE blindpair_waiting_users gauge
blindpair_waiting_users {waiting}

# HELP blindpair_sessions_active Active one-on-one sessions
# TYPE blindpair_sessions_active gauge
blindpair_sessions_active {sessions}

# HELP blindpair_rate_limiter_keys Users tracked by the message rate limiter
# TYPE blindpair_rate_limiter_keys gauge
blindpair_rate_limiter_keys {limiter_keys}

# HELP blindpair_info Server information
# TYPE blindpair_info gauge
blindpair_info{{version="{version}"}} 1

# HELP blindpair_pairings_total Sessions created
# TYPE blindpair_pairings_total counter
blindpair_pairings_total {pairings}

# HELP blindpair_sessions_ended_total Sessions ended by either participant
# TYPE blindpair_sessions_ended_total counter
blindpair_sessions_ended_total {ended}

# HELP blindpair_messages_relayed_total Payloads relayed to a partner
# TYPE blindpair_messages_relayed_total counter
blindpair_messages_relayed_total {relayed}

# HELP blindpair_bytes_relayed_total Payload bytes relayed to a partner
# TYPE blindpair_bytes_relayed_total counter
blindpair_bytes_relayed_total {bytes}

# HELP blindpair_delivery_failures_total Failed deliveries (notices and payloads)
# TYPE blindpair_delivery_failures_total counter
blindpair_delivery_failures_total {failures}

# HELP blindpair_rate_limit_hits_total Messages rejected by rate limiting
# TYPE blindpair_rate_limit_hits_total counter
blindpair_rate_limit_hits_total {rate_limits}

# HELP blindpair_repairs_total Inconsistent lobby entries healed
# TYPE blindpair_repairs_total counter
blindpair_repairs_total {repairs}
"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notifier::MockNotifier;
    use pair_types::{Payload, UserId};

    #[tokio::test]
    async fn render_reports_gauges_and_counters() {
        let relay = ChatRelay::new(Config::default(), Arc::new(MockNotifier::new())).unwrap();
        relay.on_start_request(UserId::new(1)).await;
        relay.on_start_request(UserId::new(2)).await;
        relay.on_start_request(UserId::new(3)).await;
        relay
            .on_message(UserId::new(1), Payload::from_text("hello"))
            .await
            .unwrap();

        let body = render(&relay).await;
        assert!(body.contains("blindpair_waiting_users 1\n"));
        assert!(body.contains("blindpair_sessions_active 1\n"));
        assert!(body.contains("blindpair_pairings_total 1\n"));
        assert!(body.contains("blindpair_messages_relayed_total 1\n"));
        assert!(body.contains("blindpair_bytes_relayed_total 5\n"));
    }
}
