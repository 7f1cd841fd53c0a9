//! The matchmaker.
//!
//! [`Lobby`] owns the waiting queue and the session store and is the only
//! thing that mutates them. Every operation is a plain `&mut self` call,
//! so whoever holds the lobby (behind one lock) gets "check the queue, pop
//! the head, write both session entries" as a single atomic step.
//!
//! Operations never perform I/O. They return a [`Transition`]: the reply
//! for the caller plus the [`Notification`]s other users should receive.
//! The caller delivers those after releasing its lock, and a failed
//! delivery never undoes the state change.

use crate::error::LobbyError;
use crate::queue::WaitQueue;
use crate::sessions::{SessionStore, Teardown};
use pair_types::{Notice, UserId};

/// A user's matchmaking state, derived from queue and session membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    /// Neither waiting nor paired.
    Idle,
    /// In the waiting queue.
    Waiting,
    /// In a session.
    Paired {
        /// The other participant.
        partner: UserId,
    },
}

/// A notice to deliver to a user other than the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// Recipient.
    pub to: UserId,
    /// What to tell them.
    pub notice: Notice,
}

/// Outcome of a lobby operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Status for the user who triggered the operation.
    pub reply: Notice,
    /// Post-commit notices for other users.
    pub notifications: Vec<Notification>,
    /// Inconsistencies found and healed while applying the operation.
    pub healed: Vec<LobbyError>,
}

impl Transition {
    fn with_reply(reply: Notice) -> Self {
        Self {
            reply,
            notifications: Vec::new(),
            healed: Vec::new(),
        }
    }

    fn notify(mut self, to: UserId, notice: Notice) -> Self {
        self.notifications.push(Notification { to, notice });
        self
    }
}

/// Waiting queue plus session store, mutated together.
#[derive(Debug, Default, Clone)]
pub struct Lobby {
    queue: WaitQueue,
    sessions: SessionStore,
}

impl Lobby {
    /// Create an empty lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a partner.
    ///
    /// - Paired: idempotent, the session is left alone.
    /// - Waiting: idempotent, the queue is left alone.
    /// - Idle with someone waiting: paired with the head of the queue,
    ///   who is notified.
    /// - Idle with nobody waiting: enqueued.
    pub fn request_pairing(&mut self, user: UserId) -> Transition {
        if self.sessions.is_paired(&user) {
            return Transition::with_reply(Notice::AlreadyChatting);
        }
        if self.queue.contains(&user) {
            return Transition::with_reply(Notice::StillSearching);
        }

        let mut healed = Vec::new();
        while let Ok(partner) = self.queue.dequeue_front() {
            match self.sessions.pair(user, partner) {
                Ok(()) => {
                    let mut transition =
                        Transition::with_reply(Notice::Connected).notify(partner, Notice::Connected);
                    transition.healed = healed;
                    return transition;
                }
                // A queued user who is also paired is a stale queue entry;
                // dropping it restores the invariant and we try the next one.
                Err(err) => healed.push(err),
            }
        }

        self.queue.enqueue(user);
        let mut transition = Transition::with_reply(Notice::Searching);
        transition.healed = healed;
        transition
    }

    /// Leave the waiting queue.
    ///
    /// Returns `false` if the user was not waiting.
    pub fn cancel(&mut self, user: &UserId) -> bool {
        self.queue.remove(user)
    }

    /// Fresh start: cancel any pending search and greet the user.
    ///
    /// A paired user keeps their session and is told they are already chatting.
    pub fn restart(&mut self, user: UserId) -> Transition {
        if self.sessions.is_paired(&user) {
            return Transition::with_reply(Notice::AlreadyChatting);
        }
        self.cancel(&user);
        Transition::with_reply(Notice::Welcome)
    }

    /// End the caller's conversation.
    ///
    /// Both participants return to idle in this one call; the former
    /// partner is notified. A waiting or idle user is told they are not
    /// in a conversation and their state is untouched.
    pub fn stop(&mut self, user: UserId) -> Transition {
        match self.sessions.unpair(&user) {
            Ok(teardown) => Self::ended(teardown),
            Err(_) => Transition::with_reply(Notice::NotInConversation),
        }
    }

    fn ended(teardown: Teardown) -> Transition {
        let mut transition = Transition::with_reply(Notice::ConversationEnded)
            .notify(teardown.partner, Notice::PartnerLeft);
        transition.healed.extend(teardown.inconsistency());
        transition
    }

    /// Look up a user's partner.
    pub fn partner_of(&self, user: &UserId) -> Result<UserId, LobbyError> {
        self.sessions.partner_of(user)
    }

    /// Derive a user's state.
    pub fn state_of(&self, user: &UserId) -> UserState {
        if let Ok(partner) = self.sessions.partner_of(user) {
            UserState::Paired { partner }
        } else if self.queue.contains(user) {
            UserState::Waiting
        } else {
            UserState::Idle
        }
    }

    /// Read-only view of the waiting queue.
    pub fn queue(&self) -> &WaitQueue {
        &self.queue
    }

    /// Read-only view of the session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Number of waiting users.
    pub fn waiting_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.session_count()
    }

    /// Verify that no user is both waiting and paired and that every
    /// session entry has its reverse.
    pub fn check_invariants(&self) -> Result<(), LobbyError> {
        if let Some(user) = self.queue.iter().find(|u| self.sessions.is_paired(u)) {
            return Err(LobbyError::InvariantViolation(format!(
                "user {user} is both waiting and paired"
            )));
        }
        if let Some((user, partner)) = self.sessions.dangling().into_iter().next() {
            return Err(LobbyError::InvariantViolation(format!(
                "session {user} -> {partner} is not symmetric"
            )));
        }
        Ok(())
    }

    /// Heal whatever [`check_invariants`](Self::check_invariants) would report.
    ///
    /// Dangling session entries are dropped, so their owners become idle;
    /// paired users are dropped from the queue. Returns what was healed.
    pub fn repair(&mut self) -> Vec<LobbyError> {
        let mut healed = Vec::new();

        for (user, partner) in self.sessions.dangling() {
            self.sessions.evict(&user);
            healed.push(LobbyError::InconsistentSession { user, partner });
        }

        let stale: Vec<UserId> = self
            .queue
            .iter()
            .filter(|u| self.sessions.is_paired(u))
            .copied()
            .collect();
        for user in stale {
            self.queue.remove(&user);
            healed.push(LobbyError::InvariantViolation(format!(
                "user {user} was both waiting and paired"
            )));
        }

        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: i64) -> UserId {
        UserId::new(n)
    }

    #[test]
    fn new_lobby_everyone_idle() {
        let lobby = Lobby::new();
        assert_eq!(lobby.state_of(&user(1)), UserState::Idle);
        assert_eq!(lobby.waiting_len(), 0);
        assert_eq!(lobby.session_count(), 0);
    }

    #[test]
    fn first_request_waits() {
        let mut lobby = Lobby::new();
        let t = lobby.request_pairing(user(1));

        assert_eq!(t.reply, Notice::Searching);
        assert!(t.notifications.is_empty());
        assert_eq!(lobby.state_of(&user(1)), UserState::Waiting);
        assert_eq!(lobby.queue().iter().copied().collect::<Vec<_>>(), vec![user(1)]);
    }

    #[test]
    fn second_request_pairs_with_waiting_user() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        let t = lobby.request_pairing(user(2));

        assert_eq!(t.reply, Notice::Connected);
        assert_eq!(
            t.notifications,
            vec![Notification {
                to: user(1),
                notice: Notice::Connected
            }]
        );
        assert!(lobby.queue().is_empty());
        assert_eq!(lobby.partner_of(&user(1)), Ok(user(2)));
        assert_eq!(lobby.partner_of(&user(2)), Ok(user(1)));
        assert_eq!(lobby.state_of(&user(2)), UserState::Paired { partner: user(1) });
        lobby.check_invariants().unwrap();
    }

    #[test]
    fn waiting_request_is_idempotent() {
        let mut lobby = Lobby::new();
        let first = lobby.request_pairing(user(3));
        let second = lobby.request_pairing(user(3));

        assert_eq!(first.reply, Notice::Searching);
        assert_eq!(second.reply, Notice::StillSearching);
        assert_eq!(lobby.waiting_len(), 1);
        assert_eq!(lobby.state_of(&user(3)), UserState::Waiting);
    }

    #[test]
    fn paired_request_is_idempotent() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));

        let t = lobby.request_pairing(user(1));
        assert_eq!(t.reply, Notice::AlreadyChatting);
        assert!(t.notifications.is_empty());
        assert_eq!(lobby.partner_of(&user(1)), Ok(user(2)));
        assert!(lobby.queue().is_empty());
    }

    #[test]
    fn pairing_is_fifo() {
        let mut lobby = Lobby::new();
        // X then Y arrived while nobody else was free
        lobby.queue.enqueue(user(10));
        lobby.queue.enqueue(user(11));

        let t = lobby.request_pairing(user(12));
        assert_eq!(t.notifications[0].to, user(10));
        assert_eq!(lobby.partner_of(&user(12)), Ok(user(10)));
        assert_eq!(lobby.state_of(&user(11)), UserState::Waiting);
    }

    #[test]
    fn cancel_returns_waiting_user_to_idle() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));

        assert!(lobby.cancel(&user(1)));
        assert_eq!(lobby.state_of(&user(1)), UserState::Idle);
        assert!(!lobby.cancel(&user(1)));
    }

    #[test]
    fn restart_cancels_search() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));

        let t = lobby.restart(user(1));
        assert_eq!(t.reply, Notice::Welcome);
        assert_eq!(lobby.state_of(&user(1)), UserState::Idle);
    }

    #[test]
    fn restart_keeps_session() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));

        let t = lobby.restart(user(2));
        assert_eq!(t.reply, Notice::AlreadyChatting);
        assert_eq!(lobby.partner_of(&user(2)), Ok(user(1)));
    }

    #[test]
    fn stop_tears_down_both_sides() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));

        let t = lobby.stop(user(1));
        assert_eq!(t.reply, Notice::ConversationEnded);
        assert_eq!(
            t.notifications,
            vec![Notification {
                to: user(2),
                notice: Notice::PartnerLeft
            }]
        );
        assert!(t.healed.is_empty());
        assert_eq!(lobby.state_of(&user(1)), UserState::Idle);
        assert_eq!(lobby.state_of(&user(2)), UserState::Idle);
        assert!(lobby.sessions().is_empty());
    }

    #[test]
    fn stop_without_session() {
        let mut lobby = Lobby::new();
        let t = lobby.stop(user(1));
        assert_eq!(t.reply, Notice::NotInConversation);
        assert!(t.notifications.is_empty());
    }

    #[test]
    fn stop_while_waiting_keeps_waiting() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));

        let t = lobby.stop(user(1));
        assert_eq!(t.reply, Notice::NotInConversation);
        assert_eq!(lobby.state_of(&user(1)), UserState::Waiting);
    }

    #[test]
    fn pair_then_stop_leaves_queue_alone() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));
        lobby.request_pairing(user(3));

        lobby.stop(user(2));
        assert_eq!(lobby.queue().iter().copied().collect::<Vec<_>>(), vec![user(3)]);
        assert_eq!(lobby.session_count(), 0);
    }

    #[test]
    fn stopped_users_can_pair_again() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));
        lobby.stop(user(2));

        assert_eq!(lobby.request_pairing(user(2)).reply, Notice::Searching);
        assert_eq!(lobby.request_pairing(user(1)).reply, Notice::Connected);
        assert_eq!(lobby.partner_of(&user(1)), Ok(user(2)));
    }

    #[test]
    fn stop_heals_half_session() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));
        lobby.sessions.evict(&user(1));

        let t = lobby.stop(user(2));
        assert_eq!(t.reply, Notice::ConversationEnded);
        assert_eq!(
            t.healed,
            vec![LobbyError::InconsistentSession {
                user: user(2),
                partner: user(1),
            }]
        );
        assert!(lobby.sessions().is_empty());
        lobby.check_invariants().unwrap();
    }

    #[test]
    fn stale_queue_entry_is_skipped() {
        let mut lobby = Lobby::new();
        lobby.sessions.pair(user(1), user(2)).unwrap();
        lobby.queue.enqueue(user(1));
        lobby.queue.enqueue(user(3));

        let t = lobby.request_pairing(user(4));
        assert_eq!(t.reply, Notice::Connected);
        assert_eq!(t.healed, vec![LobbyError::AlreadyPaired { user: user(1) }]);
        assert_eq!(lobby.partner_of(&user(4)), Ok(user(3)));
        assert_eq!(lobby.partner_of(&user(1)), Ok(user(2)));
        lobby.check_invariants().unwrap();
    }

    #[test]
    fn check_invariants_detects_violations() {
        let mut lobby = Lobby::new();
        lobby.sessions.pair(user(1), user(2)).unwrap();
        lobby.queue.enqueue(user(1));
        assert!(matches!(
            lobby.check_invariants(),
            Err(LobbyError::InvariantViolation(_))
        ));

        let mut lobby = Lobby::new();
        lobby.sessions.pair(user(1), user(2)).unwrap();
        lobby.sessions.evict(&user(2));
        assert!(matches!(
            lobby.check_invariants(),
            Err(LobbyError::InvariantViolation(_))
        ));
    }

    #[test]
    fn repair_heals_everything() {
        let mut lobby = Lobby::new();
        lobby.sessions.pair(user(1), user(2)).unwrap();
        lobby.sessions.pair(user(3), user(4)).unwrap();
        lobby.sessions.evict(&user(4));
        lobby.queue.enqueue(user(1));
        lobby.queue.enqueue(user(5));

        let healed = lobby.repair();
        assert_eq!(healed.len(), 2);
        lobby.check_invariants().unwrap();
        assert_eq!(lobby.state_of(&user(3)), UserState::Idle);
        assert_eq!(lobby.state_of(&user(1)), UserState::Paired { partner: user(2) });
        assert_eq!(lobby.state_of(&user(5)), UserState::Waiting);
    }

    #[test]
    fn repair_on_healthy_lobby_is_noop() {
        let mut lobby = Lobby::new();
        lobby.request_pairing(user(1));
        lobby.request_pairing(user(2));
        lobby.request_pairing(user(3));

        assert!(lobby.repair().is_empty());
        assert_eq!(lobby.session_count(), 1);
        assert_eq!(lobby.waiting_len(), 1);
    }

    #[test]
    fn every_user_in_exactly_one_state() {
        let mut lobby = Lobby::new();
        for n in 1..=7 {
            lobby.request_pairing(user(n));
        }
        lobby.stop(user(3));
        lobby.request_pairing(user(3));

        for n in 1..=8 {
            let u = user(n);
            let waiting = lobby.queue().contains(&u);
            let paired = lobby.sessions().is_paired(&u);
            assert!(!(waiting && paired), "user {u} in two states");
        }
        lobby.check_invariants().unwrap();
    }
}
