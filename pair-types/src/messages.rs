//! Message types for blindpair.
//!
//! A [`Payload`] is whatever one partner sent to the other. It is carried
//! as opaque bytes so that text, stickers, photos or any other media the
//! transport supports pass through unchanged.

use serde::{Deserialize, Serialize};

/// Opaque message content relayed between partners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Build a payload from UTF-8 text.
    pub fn from_text(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the payload, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// User-visible status notices.
///
/// The partner's identity is never part of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Greeting shown on a fresh start; any pending search was cancelled.
    Welcome,
    /// Caller was placed in the waiting queue.
    Searching,
    /// Caller was already in the waiting queue.
    StillSearching,
    /// A partner was found (sent to both sides).
    Connected,
    /// Caller is already in a conversation.
    AlreadyChatting,
    /// Caller tried to chat or stop without a partner.
    NotInConversation,
    /// Caller ended their conversation.
    ConversationEnded,
    /// The other side ended the conversation.
    PartnerLeft,
    /// Caller is sending messages too quickly.
    RateLimited,
    /// The message could not be delivered to the partner.
    DeliveryFailed,
}

impl Notice {
    /// Text shown to the user.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Welcome => {
                "Welcome to anonymous chat!\n\nPress the button below to look for someone to talk to."
            }
            Self::Searching => "Looking for a partner... please wait.",
            Self::StillSearching => "Still searching... please wait.",
            Self::Connected => {
                "Partner found! You are connected. Say hi!\n\nType /stop to end the conversation."
            }
            Self::AlreadyChatting => "You are already in a conversation! Type /stop to end it.",
            Self::NotInConversation => "You are not in a conversation.",
            Self::ConversationEnded => "You ended the conversation.",
            Self::PartnerLeft => "Your partner ended the conversation.",
            Self::RateLimited => "You are sending messages too quickly. Slow down a little.",
            Self::DeliveryFailed => "Your message could not be delivered. Try again.",
        }
    }

    /// Whether the transport should offer the "find partner" button with this notice.
    pub fn shows_menu(&self) -> bool {
        matches!(
            self,
            Self::Welcome | Self::NotInConversation | Self::ConversationEnded | Self::PartnerLeft
        )
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Something the transport is asked to deliver to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum Outbound {
    /// A status notice.
    Notice(Notice),
    /// A message relayed from the user's partner.
    Relay(Payload),
}

impl From<Notice> for Outbound {
    fn from(notice: Notice) -> Self {
        Self::Notice(notice)
    }
}
