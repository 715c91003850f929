//! Conversation message types.
//!
//! A reading's transcript is an ordered sequence of these messages;
//! insertion order is conversation order.

use serde::{Deserialize, Serialize};

/// Represents the author of a message in a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Message from the seeker (end user).
    User,
    /// Message from the automated diviner.
    Ai,
    /// Message from the live operator answering in the diviner's place.
    Operator,
}

impl MessageRole {
    /// Display label used when rendering transcripts into an
    /// instruction context.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Ai => "AI",
            MessageRole::Operator => "Live operator",
        }
    }
}

/// A single message in a reading's transcript.
///
/// Immutable once created. The timestamp is stamped at construction
/// time in RFC 3339 format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// The author of the message.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
}

impl ConversationMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a seeker message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an automated-diviner message.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Ai, content)
    }

    /// Creates a live-operator message.
    pub fn operator(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Operator, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(MessageRole::User.label(), "User");
        assert_eq!(MessageRole::Ai.label(), "AI");
        assert_eq!(MessageRole::Operator.label(), "Live operator");
    }

    #[test]
    fn test_new_message_stamps_timestamp() {
        let message = ConversationMessage::user("Hỏi thêm");
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.content, "Hỏi thêm");
        assert!(!message.timestamp.is_empty());
    }
}
