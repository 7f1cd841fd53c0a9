//! Error types for pair-relay.

use crate::notifier::DeliveryError;
use pair_core::LobbyError;
use pair_types::Notice;

/// Main error type for relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Matchmaking error.
    #[error("lobby error: {0}")]
    Lobby(#[from] LobbyError),

    /// The transport could not deliver to a user.
    #[error("delivery failure: {0}")]
    Delivery(#[from] DeliveryError),

    /// Rate limit exceeded.
    #[error("rate limit exceeded: {reason}")]
    RateLimited {
        /// Reason for rate limiting.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// The notice to show the user whose request failed, if any.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Lobby(LobbyError::NotPaired { .. }) => Some(Notice::NotInConversation),
            Self::Lobby(_) => None,
            Self::Delivery(_) => Some(Notice::DeliveryFailed),
            Self::RateLimited { .. } => Some(Notice::RateLimited),
            Self::Config(_) | Self::Io(_) => None,
        }
    }
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pair_types::UserId;

    #[test]
    fn not_paired_maps_to_not_in_conversation() {
        let err = RelayError::from(LobbyError::NotPaired {
            user: UserId::new(1),
        });
        assert_eq!(err.notice(), Some(Notice::NotInConversation));
        assert_eq!(err.to_string(), "lobby error: user 1 is not paired");
    }

    #[test]
    fn delivery_and_rate_limit_notices() {
        let err = RelayError::from(DeliveryError::Unreachable {
            user: UserId::new(2),
        });
        assert_eq!(err.notice(), Some(Notice::DeliveryFailed));

        let err = RelayError::RateLimited {
            reason: "message rate limit exceeded".into(),
        };
        assert_eq!(err.notice(), Some(Notice::RateLimited));
    }

    #[test]
    fn internal_errors_have_no_notice() {
        let err = RelayError::from(std::io::Error::other("boom"));
        assert!(err.notice().is_none());
        assert!(RelayError::from(LobbyError::EmptyQueue).notice().is_none());
    }
}
