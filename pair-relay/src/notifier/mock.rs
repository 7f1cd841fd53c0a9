//! Mock notifier for testing.
//!
//! Records every delivery and can be told to fail.

use super::{DeliveryError, Notifier};
use async_trait::async_trait;
use pair_types::{Notice, Outbound, Payload, UserId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Mock notifier for testing.
///
/// Clones share state, so a test can keep one handle and give another
/// to the relay.
#[derive(Debug, Default, Clone)]
pub struct MockNotifier {
    inner: Arc<Mutex<MockNotifierInner>>,
}

#[derive(Debug, Default)]
struct MockNotifierInner {
    delivered: Vec<(UserId, Outbound)>,
    unreachable: HashSet<UserId>,
    fail_next: Option<String>,
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful delivery, in order.
    pub fn delivered(&self) -> Vec<(UserId, Outbound)> {
        let inner = self.inner.lock().unwrap();
        inner.delivered.clone()
    }

    /// Everything delivered to one user, in order.
    pub fn delivered_to(&self, user: UserId) -> Vec<Outbound> {
        let inner = self.inner.lock().unwrap();
        inner
            .delivered
            .iter()
            .filter(|(to, _)| *to == user)
            .map(|(_, outbound)| outbound.clone())
            .collect()
    }

    /// Notices delivered to one user, in order.
    pub fn notices_for(&self, user: UserId) -> Vec<Notice> {
        self.delivered_to(user)
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Notice(notice) => Some(notice),
                Outbound::Relay(_) => None,
            })
            .collect()
    }

    /// Payloads relayed to one user, in order.
    pub fn relayed_to(&self, user: UserId) -> Vec<Payload> {
        self.delivered_to(user)
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Relay(payload) => Some(payload),
                Outbound::Notice(_) => None,
            })
            .collect()
    }

    /// Cause the next delivery to fail with a transport error.
    pub fn fail_next_delivery(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next = Some(error.to_string());
    }

    /// Make every delivery to `user` fail until [`reset`](Self::reset).
    pub fn set_unreachable(&self, user: UserId) {
        let mut inner = self.inner.lock().unwrap();
        inner.unreachable.insert(user);
    }

    /// Clear all recorded deliveries and failure settings.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockNotifierInner::default();
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn deliver(&self, to: UserId, outbound: Outbound) -> Result<(), DeliveryError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next.take() {
            return Err(DeliveryError::Transport(error));
        }
        if inner.unreachable.contains(&to) {
            return Err(DeliveryError::Unreachable { user: to });
        }

        inner.delivered.push((to, outbound));
        Ok(())
    }
}
