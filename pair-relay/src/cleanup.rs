//! Background maintenance task.
//!
//! Runs periodically to heal inconsistent lobby state and to drop rate
//! limiter entries for users who went quiet.

use crate::config::MaintenanceConfig;
use crate::server::ChatRelay;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Spawn a background maintenance task.
///
/// Returns a handle that can be used to abort the task.
pub fn spawn_maintenance_task(
    relay: Arc<ChatRelay>,
    config: MaintenanceConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !config.enabled {
            tracing::info!("Maintenance task disabled");
            return;
        }

        let interval_secs = config.interval_secs;
        tracing::info!("Maintenance task started (interval: {}s)", interval_secs);

        let mut timer = interval(Duration::from_secs(interval_secs));

        loop {
            timer.tick().await;

            let healed = relay.sweep().await;
            if healed > 0 {
                tracing::info!("Maintenance: healed {} lobby entries", healed);
            } else {
                tracing::debug!("Maintenance: lobby consistent");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notifier::MockNotifier;
    use pair_types::UserId;

    fn test_relay() -> Arc<ChatRelay> {
        Arc::new(ChatRelay::new(
            Config::default(),
            Arc::new(MockNotifier::new()),
        )
        .unwrap())
    }

    #[tokio::test]
    async fn maintenance_task_disabled() {
        let config = MaintenanceConfig {
            interval_secs: 1,
            enabled: false,
        };

        let handle = spawn_maintenance_task(test_relay(), config);

        // Task should complete immediately when disabled
        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("Task should complete when disabled")
            .expect("Task should not panic");
    }

    #[tokio::test]
    async fn maintenance_task_runs_and_aborts() {
        let relay = test_relay();
        relay.on_start_request(UserId::new(1)).await;

        let handle = spawn_maintenance_task(
            relay.clone(),
            MaintenanceConfig {
                interval_secs: 1,
                enabled: true,
            },
        );

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        relay.check_invariants().await.unwrap();
        assert_eq!(relay.stats().await.waiting, 1);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
