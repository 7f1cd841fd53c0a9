//! # pair-relay
//!
//! Anonymous one-on-one chat pairing and relay service.
//!
//! This crate:
//! - Owns the matchmaking state ([`pair_core::Lobby`]) behind a single lock
//! - Pairs users who ask for a partner, longest-waiting first
//! - Relays opaque payloads between partners without revealing who is who
//! - Tells the other side when a conversation starts or ends
//!
//! ## Architecture
//!
//! ```text
//!  transport ──► commands::parse_text ──► ChatRelay ──► Notifier ──► transport
//!                                            │
//!                                  ┌─────────┴─────────┐
//!                                  │  RwLock<Lobby>    │
//!                                  │  queue + sessions │
//!                                  └───────────────────┘
//! ```
//!
//! The messaging network itself is behind the [`notifier::Notifier`]
//! trait. The binary ships a console transport for local use.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleanup;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod limits;
pub mod notifier;
pub mod server;
