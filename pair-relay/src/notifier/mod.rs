//! Delivery seam to the messaging transport.
//!
//! The relay never talks to the network itself. Everything a user should
//! see (status notices and messages relayed from their partner) is handed
//! to a [`Notifier`], which the transport implements.
//!
//! # Design
//!
//! Delivery is best effort: an `Err` is reported back to the relay, which
//! logs and counts it. It is never fatal and never undoes a state change
//! that was already committed.

mod mock;

pub use mock::MockNotifier;

use async_trait::async_trait;
use pair_types::{Outbound, UserId};
use thiserror::Error;

/// Delivery errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The user cannot be reached (blocked the bot, deleted account, ...).
    #[error("user {user} is unreachable")]
    Unreachable {
        /// Recipient that could not be reached.
        user: UserId,
    },

    /// The transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Delivers outbound notices and relayed payloads to users.
///
/// Implementations must be cheap to call concurrently; the relay calls
/// them without holding any lock.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `outbound` to `to`.
    async fn deliver(&self, to: UserId, outbound: Outbound) -> Result<(), DeliveryError>;
}
