//! # pair-types
//!
//! Identity and message types shared by all blindpair crates.
//!
//! - [`UserId`] - Opaque participant identifier
//! - [`Payload`] - Opaque message content relayed between partners
//! - [`Notice`] - User-visible status notices
//! - [`Outbound`] - What the transport is asked to deliver

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ids;
mod messages;

pub use ids::UserId;
pub use messages::{Notice, Outbound, Payload};
