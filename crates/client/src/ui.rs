//! The capability interface the embedding host provides to the session.

use async_trait::async_trait;
use std::time::Duration;

/// Rendering and mode-query capabilities supplied by the host.
///
/// The session holds these as a shared reference for its lifetime but does
/// not own them; the host retains lifecycle control. Implementations must
/// not block: rendering happens on the same cooperative loop as connection
/// events.
#[async_trait]
pub trait ChatUi: Send + Sync {
    /// Renders a message, optionally flagged as an error, and returns an
    /// estimate of how long the user will need to read it. The estimate
    /// paces the acknowledgment sent after a `print` frame.
    async fn render(&self, message: &str, is_error: bool) -> Duration;

    /// Clears the visible conversation log.
    async fn clear_log(&self);

    /// Whether choose prompts should be answered without user interaction.
    fn is_automatic(&self) -> bool;
}
