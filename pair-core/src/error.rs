//! Error types for matchmaking.

use pair_types::UserId;
use thiserror::Error;

/// Errors raised by the queue, the session store and the lobby.
///
/// All of these are expected conditions. The relay turns them into
/// user-visible notices; none of them is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    /// A user already has a partner.
    #[error("user {user} is already paired")]
    AlreadyPaired {
        /// The user that already has a session entry.
        user: UserId,
    },

    /// A user has no partner.
    #[error("user {user} is not paired")]
    NotPaired {
        /// The user without a session entry.
        user: UserId,
    },

    /// The waiting queue is empty.
    #[error("waiting queue is empty")]
    EmptyQueue,

    /// A user cannot be paired with themselves.
    #[error("user {user} cannot be paired with themselves")]
    SelfPairing {
        /// The offending user.
        user: UserId,
    },

    /// A session entry has no matching reverse entry.
    #[error("inconsistent session: {user} -> {partner} has no reverse entry")]
    InconsistentSession {
        /// User whose entry was found.
        user: UserId,
        /// Partner whose reverse entry is missing or points elsewhere.
        partner: UserId,
    },

    /// A state invariant does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}
