//! Rate limiting for pair-relay.
//!
//! Protects partners from message floods. Two limiters apply to every
//! relayed message:
//! - a keyed limiter per [`UserId`]
//! - a direct limiter across all users
//!
//! Both use the governor crate; the keyed one is backed by DashMap.

use crate::config::LimitsConfig;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use pair_types::UserId;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Type alias for a keyed rate limiter using DashMap.
type KeyedLimiter<K> = RateLimiter<
    K,
    dashmap::DashMap<K, InMemoryState>,
    DefaultClock,
    NoOpMiddleware<governor::clock::QuantaInstant>,
>;

/// Type alias for a direct (non-keyed) rate limiter.
type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiters for relayed messages.
#[derive(Clone)]
pub struct RateLimits {
    /// Limits relayed messages per sender.
    ///
    /// Configured via `limits.messages_per_minute`.
    message_limiter: Arc<KeyedLimiter<UserId>>,

    /// Caps aggregate throughput even when every sender is within limits.
    ///
    /// Configured via `limits.global_messages_per_second`.
    global_limiter: Arc<DirectLimiter>,
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits")
            .field("message_limiter", &"KeyedLimiter<UserId>")
            .field("global_limiter", &"DirectLimiter")
            .finish()
    }
}

impl RateLimits {
    /// Create rate limiters from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configured values are zero. [`crate::config::Config::validate`]
    /// rejects such configurations before they get here.
    pub fn new(config: &LimitsConfig) -> Self {
        let messages_per_minute =
            NonZeroU32::new(config.messages_per_minute).expect("messages_per_minute must be > 0");
        let global_rps = NonZeroU32::new(config.global_messages_per_second)
            .expect("global_messages_per_second must be > 0");

        Self {
            message_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(messages_per_minute))),
            global_limiter: Arc::new(RateLimiter::direct(Quota::per_second(global_rps))),
        }
    }

    /// Check if `user` may relay another message.
    pub fn check_message(&self, user: &UserId) -> Result<(), RateLimitError> {
        self.message_limiter
            .check_key(user)
            .map_err(|_| RateLimitError::MessageLimitExceeded)
    }

    /// Check if the global relay rate is within limits.
    pub fn check_global(&self) -> Result<(), RateLimitError> {
        self.global_limiter
            .check()
            .map_err(|_| RateLimitError::GlobalLimitExceeded)
    }

    /// Get the number of tracked sender keys (for metrics).
    pub fn message_keys_count(&self) -> usize {
        self.message_limiter.len()
    }

    /// Evict entries for senders whose quota has fully recharged.
    ///
    /// Called periodically from the maintenance task.
    pub fn shrink(&self) {
        self.message_limiter.retain_recent();
    }
}

/// Rate limit error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// Too many messages from this user.
    #[error("message rate limit exceeded")]
    MessageLimitExceeded,
    /// Too many messages across all users.
    #[error("global rate limit exceeded")]
    GlobalLimitExceeded,
}
