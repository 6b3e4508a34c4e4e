use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_core::Message;
use uuid::Uuid;

/// Title of the default session created at startup and by a full reset.
pub const DEFAULT_TITLE: &str = "Current Session";

const PREVIEW_LEN: usize = 50;

/// A named, ordered container of chat messages representing one conversation
/// thread. Always holds at least one message (the seed welcome).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    /// Derived: prefix of the most recent message.
    pub preview: String,
    pub messages: Vec<Message>,
}

impl Session {
    /// Creates a session seeded with one AI welcome message.
    pub fn new(title: impl Into<String>, seed_content: &str) -> Self {
        let seed = Message::ai(seed_content);
        let now = seed.timestamp;
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: now,
            last_message_at: now,
            preview: preview_of(seed_content),
            messages: vec![seed],
        }
    }

    /// Appends a message and refreshes the derived fields.
    pub fn add_message(&mut self, message: Message) {
        self.last_message_at = message.timestamp;
        self.preview = preview_of(&message.content);
        self.messages.push(message);
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Resets the message list to a single fresh seed message.
    pub fn reset(&mut self, seed_content: &str) {
        let seed = Message::ai(seed_content);
        self.last_message_at = seed.timestamp;
        self.preview = preview_of(seed_content);
        self.messages = vec![seed];
    }
}

fn preview_of(content: &str) -> String {
    let mut prefix: String = content.chars().take(PREVIEW_LEN).collect();
    if prefix.len() < content.len() {
        prefix.push_str("...");
    }
    prefix
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_session_holds_exactly_one_seed_message() {
        let session = Session::new(DEFAULT_TITLE, "Welcome!");
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages[0].content, "Welcome!");
        assert_eq!(session.preview, "Welcome!");
    }

    #[test]
    fn add_message_updates_preview_and_count() {
        let mut session = Session::new("Session 1", "seed");
        session.add_message(Message::user("What is borrow checking?"));
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.preview, "What is borrow checking?");
    }

    #[test]
    fn long_messages_get_truncated_previews() {
        let mut session = Session::new("Session 1", "seed");
        let long = "x".repeat(120);
        session.add_message(Message::user(&long));
        assert_eq!(session.preview.len(), 53);
        assert!(session.preview.ends_with("..."));
    }

    #[test]
    fn reset_leaves_exactly_one_message() {
        let mut session = Session::new("Session 1", "seed");
        session.add_message(Message::user("a"));
        session.add_message(Message::user("b"));
        session.reset("cleared");
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages[0].content, "cleared");
    }
}
