//! Defines the WebSocket frame format exchanged with the blocks chat server.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of the `System` field on every outbound frame.
pub const SYSTEM_NAME: &str = "blocks";
/// Value of the `Resource` field for conversational frames.
pub const LANGUAGE_RESOURCE: &str = "language";
/// Fixed path of the chat WebSocket endpoint on the server.
pub const CHAT_ENDPOINT_PATH: &str = "/ws_chat";

/// A raw frame received from the server.
///
/// The payload shape depends on `message_type`, so it is kept as an untyped
/// value until [`InboundFrame::decode`] interprets it.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "MessageType")]
    pub message_type: String,
    #[serde(rename = "Message", default)]
    pub message: Value,
}

/// A decoded inbound message, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Text to display; the client acknowledges after the display pause.
    Print(String),
    /// Reset the visible conversation log.
    ProcesslistClear,
    /// A prompt with an ordered list of selectable options.
    Choose { prompt: String, options: Vec<String> },
    /// A server-reported error to display.
    Error(String),
}

impl InboundFrame {
    /// Interprets the frame payload according to its message type.
    ///
    /// Returns `Ok(None)` for an unrecognized message type; the caller is
    /// expected to drop such frames without further action. A recognized
    /// type whose payload has the wrong shape is an error.
    pub fn decode(self) -> Result<Option<InboundMessage>> {
        let message = match self.message_type.as_str() {
            "print" => InboundMessage::Print(
                serde_json::from_value(self.message).context("print payload is not a string")?,
            ),
            "processlist_clear" => InboundMessage::ProcesslistClear,
            "choose" => {
                let (prompt, options): (String, Vec<String>) = serde_json::from_value(self.message)
                    .context("choose payload is not a [prompt, options] pair")?;
                InboundMessage::Choose { prompt, options }
            }
            "error" => InboundMessage::Error(
                serde_json::from_value(self.message).context("error payload is not a string")?,
            ),
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}

/// The kind discriminant of an outbound frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutboundKind {
    /// Confirms a `print` frame once its display pause has elapsed.
    Acknowledge,
    /// Free-text user input.
    Respond,
    /// The index of a selected option, as a decimal string.
    Choice,
}

/// A frame sent to the server. Constructed immediately before send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundFrame {
    #[serde(rename = "System")]
    pub system: String,
    #[serde(rename = "Resource")]
    pub resource: String,
    #[serde(rename = "MessageType")]
    pub message_type: OutboundKind,
    #[serde(rename = "Message")]
    pub message: String,
}

impl OutboundFrame {
    /// Builds a frame addressed to the language resource of the blocks system.
    pub fn language(message_type: OutboundKind, message: impl Into<String>) -> Self {
        Self {
            system: SYSTEM_NAME.to_string(),
            resource: LANGUAGE_RESOURCE.to_string(),
            message_type,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(message_type: &str, message: Value) -> InboundFrame {
        InboundFrame {
            message_type: message_type.to_string(),
            message,
        }
    }

    #[test]
    fn test_decode_print() {
        let decoded = frame("print", json!("Hello there")).decode().unwrap();
        assert_eq!(decoded, Some(InboundMessage::Print("Hello there".into())));
    }

    #[test]
    fn test_decode_processlist_clear_ignores_payload() {
        let decoded = frame("processlist_clear", json!(["anything"])).decode().unwrap();
        assert_eq!(decoded, Some(InboundMessage::ProcesslistClear));
    }

    #[test]
    fn test_decode_choose() {
        let payload = json!(["Pick one", ["A", "B", "C"]]);
        let decoded = frame("choose", payload).decode().unwrap();
        assert_eq!(
            decoded,
            Some(InboundMessage::Choose {
                prompt: "Pick one".into(),
                options: vec!["A".into(), "B".into(), "C".into()],
            })
        );
    }

    #[test]
    fn test_decode_error() {
        let decoded = frame("error", json!("boom")).decode().unwrap();
        assert_eq!(decoded, Some(InboundMessage::Error("boom".into())));
    }

    #[test]
    fn test_decode_unrecognized_kind_is_none() {
        let decoded = frame("telemetry", json!({"x": 1})).decode().unwrap();
        assert_eq!(decoded, None);
    }

    #[test]
    fn test_decode_missing_payload_defaults_to_null() {
        let raw = r#"{"MessageType":"processlist_clear"}"#;
        let parsed: InboundFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.decode().unwrap(), Some(InboundMessage::ProcesslistClear));
    }

    #[test]
    fn test_decode_print_with_bad_payload_is_error() {
        assert!(frame("print", json!(42)).decode().is_err());
    }

    #[test]
    fn test_decode_choose_with_bad_payload_is_error() {
        assert!(frame("choose", json!("not a pair")).decode().is_err());
    }

    #[test]
    fn test_inbound_frame_parse() {
        let raw = r#"{"MessageType":"print","Message":"hi"}"#;
        let parsed: InboundFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.message_type, "print");
        assert_eq!(parsed.message, json!("hi"));
    }

    #[test]
    fn test_outbound_frame_wire_format() {
        let frame = OutboundFrame::language(OutboundKind::Respond, "hello");
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"System":"blocks","Resource":"language","MessageType":"respond","Message":"hello"}"#
        );
    }

    #[test]
    fn test_outbound_kind_wire_names() {
        assert_eq!(serde_json::to_string(&OutboundKind::Acknowledge).unwrap(), "\"acknowledge\"");
        assert_eq!(serde_json::to_string(&OutboundKind::Respond).unwrap(), "\"respond\"");
        assert_eq!(serde_json::to_string(&OutboundKind::Choice).unwrap(), "\"choice\"");
    }

    #[test]
    fn test_acknowledge_frame_has_empty_message() {
        let frame = OutboundFrame::language(OutboundKind::Acknowledge, "");
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""MessageType":"acknowledge""#));
        assert!(json.contains(r#""Message":"""#));
    }
}
