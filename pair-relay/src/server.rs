//! Main ChatRelay coordination.
//!
//! ChatRelay owns the lobby, applies user requests to it under one lock
//! and delivers the results through the [`Notifier`].

use crate::commands::Inbound;
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::limits::RateLimits;
use crate::notifier::Notifier;
use pair_core::{Lobby, LobbyError, Notification, Transition, UserState};
use pair_types::{Notice, Outbound, Payload, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Operational metrics for monitoring relay activity.
///
/// All counters are monotonically increasing (reset only on restart).
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Sessions created.
    pub pairings_total: AtomicU64,
    /// Sessions ended by either side.
    pub sessions_ended_total: AtomicU64,
    /// Payloads handed to the notifier for a partner.
    pub messages_relayed: AtomicU64,
    /// Payload bytes relayed.
    pub bytes_relayed: AtomicU64,
    /// Notifier deliveries that failed (notices and payloads).
    pub delivery_failures: AtomicU64,
    /// Messages rejected by a rate limiter.
    pub rate_limit_hits: AtomicU64,
    /// Inconsistent lobby entries healed.
    pub repairs_total: AtomicU64,
}

/// Point-in-time lobby counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStats {
    /// Users waiting for a partner.
    pub waiting: usize,
    /// Active sessions.
    pub sessions: usize,
}

/// Main relay service.
pub struct ChatRelay {
    config: Config,
    /// Queue and sessions: the single exclusive-access domain.
    lobby: RwLock<Lobby>,
    notifier: Arc<dyn Notifier>,
    rate_limits: RateLimits,
    metrics: RelayMetrics,
}

impl std::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("config", &self.config)
            .field("rate_limits", &self.rate_limits)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl ChatRelay {
    /// Create a new ChatRelay delivering through `notifier`.
    ///
    /// The configuration is validated first, so limits built in code get
    /// the same checks as a loaded file.
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        config.validate()?;
        let rate_limits = RateLimits::new(&config.limits);
        Ok(Self {
            config,
            lobby: RwLock::new(Lobby::new()),
            notifier,
            rate_limits,
            metrics: RelayMetrics::default(),
        })
    }

    /// Get the relay configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get access to the rate limiters.
    pub fn rate_limits(&self) -> &RateLimits {
        &self.rate_limits
    }

    /// Get access to the operational metrics.
    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Ask for a partner (the "find partner" button).
    ///
    /// Returns the caller's status. When a partner is found they are
    /// notified as well.
    pub async fn on_start_request(&self, user: UserId) -> Notice {
        let transition = self.lobby.write().await.request_pairing(user);

        match transition.reply {
            Notice::Connected => {
                self.metrics.pairings_total.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Paired {} with longest-waiting user", user);
            }
            Notice::Searching => tracing::debug!("User {} is waiting for a partner", user),
            _ => {}
        }

        self.commit(user, transition).await
    }

    /// Fresh start (the `/start` command).
    ///
    /// Cancels a pending search. A user in a conversation keeps it.
    pub async fn on_menu_request(&self, user: UserId) -> Notice {
        let transition = self.lobby.write().await.restart(user);
        self.commit(user, transition).await
    }

    /// End the caller's conversation (the `/stop` command).
    ///
    /// Both sides become idle; the former partner is told.
    pub async fn on_stop_request(&self, user: UserId) -> Notice {
        let transition = self.lobby.write().await.stop(user);

        if transition.reply == Notice::ConversationEnded {
            self.metrics
                .sessions_ended_total
                .fetch_add(1, Ordering::Relaxed);
            tracing::debug!("User {} ended their conversation", user);
        }

        self.commit(user, transition).await
    }

    /// Relay a payload to the sender's partner.
    ///
    /// The payload is passed through untouched. Delivery failures are
    /// returned to the caller, never retried.
    pub async fn on_message(&self, user: UserId, payload: Payload) -> Result<()> {
        let partner = self.lobby.read().await.partner_of(&user)?;

        // Per-sender first: a rejected sender must not spend global quota
        if let Err(e) = self
            .rate_limits
            .check_message(&user)
            .and_then(|()| self.rate_limits.check_global())
        {
            tracing::warn!("Message rate limited for {}: {}", user, e);
            self.metrics.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
            return Err(RelayError::RateLimited {
                reason: e.to_string(),
            });
        }

        let size = payload.len() as u64;
        if let Err(e) = self
            .notifier
            .deliver(partner, Outbound::Relay(payload))
            .await
        {
            self.metrics
                .delivery_failures
                .fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Failed to relay message from {}: {}", user, e);
            return Err(e.into());
        }

        self.metrics.messages_relayed.fetch_add(1, Ordering::Relaxed);
        self.metrics.bytes_relayed.fetch_add(size, Ordering::Relaxed);
        Ok(())
    }

    /// Route a parsed inbound event.
    ///
    /// Returns the notice to show the caller, if any. A successfully
    /// relayed message needs no reply.
    pub async fn dispatch(&self, user: UserId, inbound: Inbound) -> Option<Notice> {
        match inbound {
            Inbound::Menu => Some(self.on_menu_request(user).await),
            Inbound::FindPartner => Some(self.on_start_request(user).await),
            Inbound::Stop => Some(self.on_stop_request(user).await),
            Inbound::Message(payload) => match self.on_message(user, payload).await {
                Ok(()) => None,
                Err(e) => e.notice(),
            },
        }
    }

    /// Dispatch an event and deliver the reply to the caller.
    pub async fn handle(&self, user: UserId, inbound: Inbound) {
        if let Some(reply) = self.dispatch(user, inbound).await {
            self.deliver_notice(user, reply).await;
        }
    }

    /// Derive a user's current state.
    pub async fn user_state(&self, user: &UserId) -> UserState {
        self.lobby.read().await.state_of(user)
    }

    /// Look up a user's partner.
    pub async fn partner_of(&self, user: &UserId) -> std::result::Result<UserId, LobbyError> {
        self.lobby.read().await.partner_of(user)
    }

    /// Current waiting and session counts, from one consistent snapshot.
    pub async fn stats(&self) -> LobbyStats {
        let lobby = self.lobby.read().await;
        LobbyStats {
            waiting: lobby.waiting_len(),
            sessions: lobby.session_count(),
        }
    }

    /// Verify lobby invariants.
    pub async fn check_invariants(&self) -> std::result::Result<(), LobbyError> {
        self.lobby.read().await.check_invariants()
    }

    /// Heal inconsistent lobby state and shrink limiter bookkeeping.
    ///
    /// Returns the number of entries healed.
    pub async fn sweep(&self) -> usize {
        let healed = self.lobby.write().await.repair();
        for problem in &healed {
            tracing::warn!("Maintenance healed lobby state: {}", problem);
        }
        self.metrics
            .repairs_total
            .fetch_add(healed.len() as u64, Ordering::Relaxed);
        self.rate_limits.shrink();
        healed.len()
    }

    /// Apply the post-commit half of a transition.
    ///
    /// Runs after the lobby lock is released. Failed notifications are
    /// logged; the state change stands.
    async fn commit(&self, user: UserId, transition: Transition) -> Notice {
        let Transition {
            reply,
            notifications,
            healed,
        } = transition;

        for problem in &healed {
            tracing::warn!("Healed lobby state while serving {}: {}", user, problem);
        }
        self.metrics
            .repairs_total
            .fetch_add(healed.len() as u64, Ordering::Relaxed);

        for Notification { to, notice } in notifications {
            self.deliver_notice(to, notice).await;
        }

        reply
    }

    async fn deliver_notice(&self, to: UserId, notice: Notice) {
        if let Err(e) = self.notifier.deliver(to, Outbound::Notice(notice)).await {
            self.metrics
                .delivery_failures
                .fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Failed to deliver {:?} to {}: {}", notice, to, e);
        }
    }
}
