//! # pair-core
//!
//! Pure matchmaking logic for blindpair (no I/O, instant tests).
//!
//! This crate holds the waiting queue, the session registry and the
//! matchmaker that mutates both. Nothing here locks, awaits or talks to
//! the network: the relay owns a single [`Lobby`] behind one lock and
//! performs the [`Notification`]s each transition asks for after the
//! lock is released.
//!
//! ## User states
//!
//! A user's state is derived from membership, never stored:
//!
//! | In queue | In sessions | State     |
//! |----------|-------------|-----------|
//! | no       | no          | `Idle`    |
//! | yes      | no          | `Waiting` |
//! | no       | yes         | `Paired`  |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lobby;
pub mod queue;
pub mod sessions;

pub use error::LobbyError;
pub use lobby::{Lobby, Notification, Transition, UserState};
pub use queue::WaitQueue;
pub use sessions::{SessionStore, Teardown};
