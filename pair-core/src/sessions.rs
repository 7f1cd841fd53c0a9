//! Registry of active one-on-one sessions.
//!
//! A session {A, B} is stored as two entries, `A -> B` and `B -> A`, so
//! either participant can find their partner in O(1). Both entries are
//! written together by [`SessionStore::pair`] and removed together by
//! [`SessionStore::unpair`].

use crate::error::LobbyError;
use pair_types::UserId;
use std::collections::HashMap;

/// Result of tearing a session down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teardown {
    /// User that asked for the teardown.
    pub user: UserId,
    /// Their former partner, to be told the conversation ended.
    pub partner: UserId,
    /// `false` when the partner's reverse entry was missing or pointed
    /// at someone else. The user's own entry is removed either way.
    pub consistent: bool,
}

impl Teardown {
    /// The inconsistency this teardown healed, if any.
    pub fn inconsistency(&self) -> Option<LobbyError> {
        (!self.consistent).then_some(LobbyError::InconsistentSession {
            user: self.user,
            partner: self.partner,
        })
    }
}

/// Symmetric user-to-partner mapping.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    partners: HashMap<UserId, UserId>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session between `a` and `b`.
    ///
    /// Fails without writing anything if either user already has a partner.
    pub fn pair(&mut self, a: UserId, b: UserId) -> Result<(), LobbyError> {
        if a == b {
            return Err(LobbyError::SelfPairing { user: a });
        }
        for user in [a, b] {
            if self.partners.contains_key(&user) {
                return Err(LobbyError::AlreadyPaired { user });
            }
        }
        self.partners.insert(a, b);
        self.partners.insert(b, a);
        Ok(())
    }

    /// Look up a user's partner.
    pub fn partner_of(&self, user: &UserId) -> Result<UserId, LobbyError> {
        self.partners
            .get(user)
            .copied()
            .ok_or(LobbyError::NotPaired { user: *user })
    }

    /// Tear down the session `user` belongs to.
    ///
    /// Removes the user's entry and the partner's reverse entry. If the
    /// reverse entry is missing, only the user's entry is removed; if it
    /// points at a third user it is left in place, since it belongs to
    /// that other session. Both cases are reported through
    /// [`Teardown::consistent`] instead of failing.
    pub fn unpair(&mut self, user: &UserId) -> Result<Teardown, LobbyError> {
        let partner = self
            .partners
            .remove(user)
            .ok_or(LobbyError::NotPaired { user: *user })?;

        let consistent = match self.partners.get(&partner) {
            Some(back) if back == user => {
                self.partners.remove(&partner);
                true
            }
            _ => false,
        };

        Ok(Teardown {
            user: *user,
            partner,
            consistent,
        })
    }

    /// Check whether a user has a partner.
    pub fn is_paired(&self, user: &UserId) -> bool {
        self.partners.contains_key(user)
    }

    /// Entries whose partner does not point back.
    pub fn dangling(&self) -> Vec<(UserId, UserId)> {
        let mut found: Vec<(UserId, UserId)> = self
            .partners
            .iter()
            .filter(|&(user, partner)| self.partners.get(partner) != Some(user))
            .map(|(user, partner)| (*user, *partner))
            .collect();
        found.sort();
        found
    }

    /// Remove a single entry without touching its reverse.
    ///
    /// Only used to heal dangling entries.
    pub(crate) fn evict(&mut self, user: &UserId) -> Option<UserId> {
        self.partners.remove(user)
    }

    /// Number of complete (symmetric) sessions.
    pub fn session_count(&self) -> usize {
        self.partners
            .iter()
            .filter(|&(user, partner)| user < partner && self.partners.get(partner) == Some(user))
            .count()
    }

    /// Number of paired users (entries), including any dangling ones.
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    /// Check if there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Iterate over complete sessions, each reported once as `(lower, higher)`.
    pub fn sessions(&self) -> impl Iterator<Item = (UserId, UserId)> + '_ {
        self.partners
            .iter()
            .filter(|&(user, partner)| user < partner && self.partners.get(partner) == Some(user))
            .map(|(user, partner)| (*user, *partner))
    }

    /// Iterate over every paired user.
    pub fn users(&self) -> impl Iterator<Item = &UserId> {
        self.partners.keys()
    }
}
