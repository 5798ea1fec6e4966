//! Inbound RTM event shape.

use serde::Deserialize;

/// An inbound RTM event. Every field is optional; the bot only reacts to
/// well-formed messages in its configured channel and ignores the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub channel: Option<String>,
    pub user: Option<String>,
    pub text: Option<String>,
}

impl InboundEvent {
    /// Returns the message text when this is a user message in the given
    /// channel, `None` otherwise.
    pub fn message_text(&self, channel: &str) -> Option<&str> {
        if self.kind.as_deref() != Some("message") {
            return None;
        }
        if self.channel.as_deref() != Some(channel) {
            return None;
        }
        self.user.as_ref()?;
        self.text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(channel: &str) -> InboundEvent {
        InboundEvent {
            kind: Some("message".to_string()),
            channel: Some(channel.to_string()),
            user: Some("U123".to_string()),
            text: Some("cc btc".to_string()),
        }
    }

    #[test]
    fn test_accepts_message_in_channel() {
        assert_eq!(message("C1").message_text("C1"), Some("cc btc"));
    }

    #[test]
    fn test_rejects_other_channels_and_kinds() {
        assert_eq!(message("C2").message_text("C1"), None);

        let mut typing = message("C1");
        typing.kind = Some("user_typing".to_string());
        assert_eq!(typing.message_text("C1"), None);

        let mut botish = message("C1");
        botish.user = None;
        assert_eq!(botish.message_text("C1"), None);

        let mut empty = message("C1");
        empty.text = None;
        assert_eq!(empty.message_text("C1"), None);
    }

    #[test]
    fn test_deserializes_sparse_events() {
        let event: InboundEvent = serde_json::from_str("{\"type\": \"hello\"}").unwrap();
        assert_eq!(event.kind.as_deref(), Some("hello"));
        assert_eq!(event.message_text("C1"), None);
    }
}
