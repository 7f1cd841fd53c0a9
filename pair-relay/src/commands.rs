//! Inbound command parsing.
//!
//! Turns what a user typed (or which button they pressed) into an
//! [`Inbound`] event for [`ChatRelay::dispatch`](crate::server::ChatRelay::dispatch).

use pair_types::Payload;

/// Callback data carried by the "find partner" button.
pub const FIND_PARTNER_CALLBACK: &str = "find_partner";

/// An inbound user event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start` or any unrecognised command: show the menu, cancelling a pending search.
    Menu,
    /// `/find` or the "find partner" button: ask for a partner.
    FindPartner,
    /// `/stop`: end the current conversation.
    Stop,
    /// Anything else: relay to the partner.
    Message(Payload),
}

/// Parse a text message.
///
/// Commands may carry a `@botname` suffix and trailing arguments, both ignored.
pub fn parse_text(text: &str) -> Inbound {
    let Some(command) = text.trim_start().strip_prefix('/') else {
        return Inbound::Message(Payload::from_text(text));
    };

    let name = command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();

    match name.to_ascii_lowercase().as_str() {
        "stop" => Inbound::Stop,
        "find" | "next" => Inbound::FindPartner,
        _ => Inbound::Menu,
    }
}

/// Parse button callback data. Unknown callbacks are ignored.
pub fn parse_callback(data: &str) -> Option<Inbound> {
    (data == FIND_PARTNER_CALLBACK).then_some(Inbound::FindPartner)
}
