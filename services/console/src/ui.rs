//! Terminal implementation of the session's UI capability.

use async_trait::async_trait;
use blocks_client::ChatUi;
use std::io::Write;
use std::time::Duration;

/// Floor for the display pause so short messages are still readable.
const BASE_PAUSE: Duration = Duration::from_millis(600);
/// Reading-pace increment per character of message text.
const PAUSE_PER_CHAR: Duration = Duration::from_millis(30);
/// Ceiling for the display pause on long messages.
const MAX_PAUSE: Duration = Duration::from_secs(6);

/// Renders the conversation on stdout/stderr and clears it with ANSI
/// escapes.
pub struct ConsoleUi {
    automatic: bool,
}

impl ConsoleUi {
    pub fn new(automatic: bool) -> Self {
        Self { automatic }
    }
}

#[async_trait]
impl ChatUi for ConsoleUi {
    async fn render(&self, message: &str, is_error: bool) -> Duration {
        if is_error {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
        display_pause(message)
    }

    async fn clear_log(&self) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\x1b[2J\x1b[1;1H");
        let _ = stdout.flush();
    }

    fn is_automatic(&self) -> bool {
        self.automatic
    }
}

/// Estimates how long the user needs to read a message.
fn display_pause(message: &str) -> Duration {
    let reading = BASE_PAUSE + PAUSE_PER_CHAR * message.chars().count() as u32;
    reading.min(MAX_PAUSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pause_has_a_floor() {
        assert_eq!(display_pause(""), BASE_PAUSE);
    }

    #[test]
    fn test_display_pause_grows_with_length() {
        let short = display_pause("hi");
        let long = display_pause("a considerably longer message to read");
        assert!(long > short);
    }

    #[test]
    fn test_display_pause_is_capped() {
        let very_long = "x".repeat(10_000);
        assert_eq!(display_pause(&very_long), MAX_PAUSE);
    }

    #[test]
    fn test_is_automatic_reflects_configuration() {
        assert!(ConsoleUi::new(true).is_automatic());
        assert!(!ConsoleUi::new(false).is_automatic());
    }
}
