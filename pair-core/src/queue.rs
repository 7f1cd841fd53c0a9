//! FIFO waiting queue for users looking for a partner.
//!
//! Order lives in a `VecDeque`; a `HashSet` mirrors it so membership
//! checks stay O(1) and duplicates are impossible.

use crate::error::LobbyError;
use pair_types::UserId;
use std::collections::{HashSet, VecDeque};

/// Users waiting for a partner, longest-waiting first.
#[derive(Debug, Default, Clone)]
pub struct WaitQueue {
    /// Arrival order.
    order: VecDeque<UserId>,
    /// Membership index, always equal to the contents of `order`.
    members: HashSet<UserId>,
}

impl WaitQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user at the tail.
    ///
    /// Returns `false` without touching the queue if the user is already waiting.
    pub fn enqueue(&mut self, user: UserId) -> bool {
        if !self.members.insert(user) {
            return false;
        }
        self.order.push_back(user);
        true
    }

    /// Remove and return the longest-waiting user.
    pub fn dequeue_front(&mut self) -> Result<UserId, LobbyError> {
        let user = self.order.pop_front().ok_or(LobbyError::EmptyQueue)?;
        self.members.remove(&user);
        Ok(user)
    }

    /// Remove a user wherever they are in the queue.
    ///
    /// Returns `false` if the user was not waiting.
    pub fn remove(&mut self, user: &UserId) -> bool {
        if !self.members.remove(user) {
            return false;
        }
        self.order.retain(|u| u != user);
        true
    }

    /// Check whether a user is waiting.
    pub fn contains(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Peek at the longest-waiting user.
    pub fn front(&self) -> Option<&UserId> {
        self.order.front()
    }

    /// Number of waiting users.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nobody is waiting.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over waiting users in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: i64) -> UserId {
        UserId::new(n)
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = WaitQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.front().is_none());
    }

    #[test]
    fn enqueue_dequeue_fifo() {
        let mut queue = WaitQueue::new();
        assert!(queue.enqueue(user(1)));
        assert!(queue.enqueue(user(2)));
        assert!(queue.enqueue(user(3)));

        assert_eq!(queue.dequeue_front(), Ok(user(1)));
        assert_eq!(queue.dequeue_front(), Ok(user(2)));
        assert_eq!(queue.dequeue_front(), Ok(user(3)));
        assert!(queue.is_empty());
    }

    #[test]
    fn dequeue_empty_fails() {
        let mut queue = WaitQueue::new();
        assert_eq!(queue.dequeue_front(), Err(LobbyError::EmptyQueue));
    }

    #[test]
    fn enqueue_twice_is_noop() {
        let mut queue = WaitQueue::new();
        assert!(queue.enqueue(user(1)));
        assert!(!queue.enqueue(user(1)));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![user(1)]);
    }

    #[test]
    fn remove_from_middle_keeps_order() {
        let mut queue = WaitQueue::new();
        queue.enqueue(user(1));
        queue.enqueue(user(2));
        queue.enqueue(user(3));

        assert!(queue.remove(&user(2)));
        assert!(!queue.contains(&user(2)));
        assert_eq!(
            queue.iter().copied().collect::<Vec<_>>(),
            vec![user(1), user(3)]
        );
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut queue = WaitQueue::new();
        queue.enqueue(user(1));

        assert!(!queue.remove(&user(9)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn removed_user_can_rejoin_at_tail() {
        let mut queue = WaitQueue::new();
        queue.enqueue(user(1));
        queue.enqueue(user(2));
        queue.remove(&user(1));
        queue.enqueue(user(1));

        assert_eq!(queue.front(), Some(&user(2)));
        assert_eq!(
            queue.iter().copied().collect::<Vec<_>>(),
            vec![user(2), user(1)]
        );
    }

    #[test]
    fn contains_tracks_membership() {
        let mut queue = WaitQueue::new();
        queue.enqueue(user(5));
        assert!(queue.contains(&user(5)));

        queue.dequeue_front().unwrap();
        assert!(!queue.contains(&user(5)));
    }
}
