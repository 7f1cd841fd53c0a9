//! Line-based console transport.
//!
//! Lets a single terminal play any number of users. Each input line is
//! `<user-id> <text>`; the text goes through [`parse_text`] exactly as a
//! chat message would. Deliveries are printed as
//! `-> <user-id>: <text>`.

use crate::commands::{parse_text, Inbound};
use crate::notifier::{DeliveryError, Notifier};
use crate::server::ChatRelay;
use async_trait::async_trait;
use pair_types::{Outbound, UserId};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// Notifier that prints every delivery to stdout.
#[derive(Debug)]
pub struct ConsoleNotifier {
    stdout: Mutex<tokio::io::Stdout>,
}

impl ConsoleNotifier {
    /// Create a notifier writing to this process's stdout.
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn deliver(&self, to: UserId, outbound: Outbound) -> Result<(), DeliveryError> {
        let line = render(to, &outbound);
        let mut stdout = self.stdout.lock().await;
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}

/// Format one delivery as a console line.
pub fn render(to: UserId, outbound: &Outbound) -> String {
    match outbound {
        Outbound::Notice(notice) if notice.shows_menu() => {
            format!("-> {}: {} [find partner: /find]\n", to, notice.text())
        }
        Outbound::Notice(notice) => format!("-> {}: {}\n", to, notice.text()),
        Outbound::Relay(payload) => format!(
            "-> {}: partner says: {}\n",
            to,
            String::from_utf8_lossy(payload.as_bytes())
        ),
    }
}

/// Parse `<user-id> <text>`. Blank or malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<(UserId, Inbound)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (id, text) = line.trim_start().split_once(' ')?;
    let user = id.parse::<UserId>().ok()?;
    if text.is_empty() {
        return None;
    }
    Some((user, parse_text(text)))
}

/// Feed lines from `input` to the relay until end of input.
pub async fn run<R>(relay: Arc<ChatRelay>, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Some((user, inbound)) => relay.handle(user, inbound).await,
            None if line.trim().is_empty() => {}
            None => tracing::warn!("Ignoring malformed console line (expected `<user-id> <text>`)"),
        }
    }
    Ok(())
}
