use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The participant that authored a [`Message`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// A human end-user.
    User,
    /// The AI tutor.
    Ai,
}

/// How a message should be presented.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain conversational text.
    #[default]
    Text,
    /// Summary of an uploaded document's (simulated) analysis.
    DocumentAnalysis,
    /// A study suggestion offered by the tutor.
    Suggestion,
}

/// A single message within a chat session.
///
/// Messages are immutable once created and are never deleted individually,
/// only discarded in bulk when their session is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: Uuid,
    /// The textual content of the message.
    pub content: String,
    /// The author of the message.
    pub sender: Sender,
    /// UTC timestamp of when the message was created.
    pub timestamp: DateTime<Utc>,
    /// Presentation kind; defaults to plain text.
    #[serde(default)]
    pub kind: MessageKind,
}

impl Message {
    /// Creates a new message with the given sender, kind, and content.
    pub fn new(sender: Sender, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            kind,
        }
    }

    /// Creates a plain-text message from the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageKind::Text, content)
    }

    /// Creates a plain-text message from the AI tutor.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, MessageKind::Text, content)
    }

    /// Creates an AI message with an explicit kind.
    pub fn ai_with_kind(kind: MessageKind, content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, kind, content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.sender, Sender::User);
        assert_eq!(msg.content, "Hello");
        assert_eq!(msg.kind, MessageKind::Text);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::ai_with_kind(MessageKind::DocumentAnalysis, "analyzed");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"document_analysis\""));
        assert!(json.contains("\"ai\""));
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "analyzed");
        assert_eq!(deserialized.kind, MessageKind::DocumentAnalysis);
    }

    #[test]
    fn test_kind_defaults_to_text() {
        let json = r#"{
            "id": "6f2b2a34-7a53-4ef0-9a15-0a4f54bb6b2a",
            "content": "hi",
            "sender": "user",
            "timestamp": "2025-01-01T00:00:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
    }
}
