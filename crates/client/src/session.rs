//! The message-dispatch state machine and the guarded outbound send path.

use crate::{
    link::{Link, LinkState},
    protocol::{InboundFrame, InboundMessage, OutboundFrame, OutboundKind},
    ui::ChatUi,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Option index submitted for a choose prompt in automatic mode. The
/// historical behavior picks the second option, not the first.
const AUTO_SELECT_INDEX: usize = 1;

/// Notice rendered in place of a send once the connection has closed.
pub const CLOSED_NOTICE: &str =
    "Sorry, the connection to the server is closed. Restart the client for a new connection";

/// One live chat session: the injected UI capability plus the link handle.
///
/// Constructed by [`crate::link::connect`] and valid for the life of that
/// one connection. Cloning is cheap and shares the same connection, which is
/// how deferred acknowledgments re-enter the guarded send path.
#[derive(Clone)]
pub struct ChatSession {
    ui: Arc<dyn ChatUi>,
    link: Link,
}

impl ChatSession {
    pub(crate) fn new(ui: Arc<dyn ChatUi>, link: Link) -> Self {
        Self { ui, link }
    }

    /// Dispatches one inbound frame.
    ///
    /// Frames with an unrecognized kind are dropped without any capability
    /// invocation. A recognized kind carrying a malformed payload is an
    /// error, which terminates the session.
    pub async fn handle_frame(&self, frame: InboundFrame) -> Result<()> {
        debug!(kind = %frame.message_type, "received frame");
        let Some(message) = frame.decode()? else {
            return Ok(());
        };
        match message {
            InboundMessage::Print(text) => {
                let pause = self.ui.render(&text, false).await;
                // Acknowledge once the display pause has elapsed. The timer
                // is never cancelled; the send guard re-checks the link
                // state when it fires.
                let session = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(pause).await;
                    session.send(OutboundKind::Acknowledge, String::new()).await;
                });
            }
            InboundMessage::ProcesslistClear => self.ui.clear_log().await,
            InboundMessage::Choose { prompt, options } => self.choose(&prompt, &options).await,
            InboundMessage::Error(text) => {
                self.ui.render(&wrap_error(&text), true).await;
            }
        }
        Ok(())
    }

    /// Forwards free-text user input as a `respond` frame, unconditionally.
    pub async fn submit_input(&self, text: &str) {
        self.send(OutboundKind::Respond, text.to_string()).await;
    }

    /// Sends the selected option index as a `choice` frame. Called by the
    /// host when the user picks an option, or by the automatic-mode branch.
    pub async fn select_option(&self, index: usize) {
        self.send(OutboundKind::Choice, index.to_string()).await;
    }

    async fn choose(&self, prompt: &str, options: &[String]) {
        self.ui.render(&compose_choices(prompt, options), false).await;
        if self.ui.is_automatic() {
            self.select_option(AUTO_SELECT_INDEX).await;
        }
    }

    /// Guard-then-send. Once the link is closing or closed, or the pump has
    /// terminated, the frame is dropped and the user sees the closed notice
    /// instead; no error is raised.
    async fn send(&self, kind: OutboundKind, message: String) {
        debug!(?kind, %message, "sending frame");
        if matches!(self.link.state(), LinkState::Closing | LinkState::Closed)
            || !self.link.transmit(OutboundFrame::language(kind, message))
        {
            self.ui.render(CLOSED_NOTICE, false).await;
        }
    }
}

/// Composes a choose prompt followed by one option line per entry, each
/// tagged with its zero-based index.
fn compose_choices(prompt: &str, options: &[String]) -> String {
    let mut out = String::from(prompt);
    for (index, option) in options.iter().enumerate() {
        out.push_str(&format!("\n\n[{index}] {option}"));
    }
    out
}

fn wrap_error(text: &str) -> String {
    format!("ERROR\n{text}")
}
