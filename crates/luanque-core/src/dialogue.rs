//! Dialogue-service abstraction.
//!
//! The generative backend is treated as an opaque request/response
//! capability: `open` a conversation with a fixed system instruction,
//! then `send` turns on the returned handle. Implementations live in
//! `luanque-interaction`; the engine itself never retries failed calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A binary payload with its mime type, as supplied by artifact intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Raw bytes of the uploaded file
    pub data: Vec<u8>,
    /// Mime type reported by the intake collaborator (e.g. "image/jpeg")
    pub mime_type: String,
}

impl Attachment {
    /// Creates a new attachment.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Whether the payload carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Content of a single outbound turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContent {
    /// Natural-language text of the turn
    pub text: String,
    /// Optional inline binary attachment sent alongside the text
    pub attachment: Option<Attachment>,
}

impl TurnContent {
    /// Creates a text-only turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    /// Creates a turn carrying an inline attachment.
    pub fn multimodal(text: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            text: text.into(),
            attachment: Some(attachment),
        }
    }
}

/// Errors surfaced by dialogue-service implementations.
#[derive(Error, Debug, Clone)]
pub enum DialogueError {
    /// The service call failed (transport or HTTP-level)
    #[error("Dialogue request failed: {message}")]
    Process {
        /// HTTP status code, when the failure came from a response
        status_code: Option<u16>,
        message: String,
        /// Whether the caller could reasonably retry
        is_retryable: bool,
        /// Server-suggested delay before retrying, when provided
        retry_after: Option<Duration>,
    },

    /// The turn content cannot be sent (e.g. nothing to transmit)
    #[error("Invalid dialogue payload: {0}")]
    InvalidPayload(String),

    /// Anything else (response parsing, unexpected shapes)
    #[error("{0}")]
    Other(String),
}

impl DialogueError {
    /// Whether this failure is worth retrying at a higher layer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Process {
                is_retryable: true,
                ..
            }
        )
    }
}

/// Opens stateful conversations with the generative backend.
#[async_trait]
pub trait DialogueService: Send + Sync {
    /// Opens a new conversation with the given system instruction.
    ///
    /// The instruction is fixed for the conversation's lifetime.
    ///
    /// # Errors
    ///
    /// Returns a `DialogueError` if the conversation cannot be opened.
    async fn open(
        &self,
        system_instruction: &str,
    ) -> Result<Box<dyn DialogueConversation>, DialogueError>;
}

/// An open conversation handle.
///
/// The handle is a capability object owned exclusively by the active
/// session; dropping it abandons the conversation. No explicit close
/// call exists or is needed.
#[async_trait]
pub trait DialogueConversation: Send + Sync {
    /// Sends one turn and returns the responder's text.
    ///
    /// # Errors
    ///
    /// Returns a `DialogueError` on failure; a failed turn must leave
    /// the conversation usable for subsequent turns.
    async fn send(&mut self, turn: TurnContent) -> Result<String, DialogueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_turn_has_no_attachment() {
        let turn = TurnContent::text("Hỏi thêm về lời giải");
        assert!(turn.attachment.is_none());
    }

    #[test]
    fn test_multimodal_turn_carries_attachment() {
        let turn = TurnContent::multimodal(
            "Đây là quẻ tôi vừa gieo được",
            Attachment::new(vec![1, 2, 3], "image/png"),
        );
        let attachment = turn.attachment.unwrap();
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(attachment.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_retryable_classification() {
        let err = DialogueError::Process {
            status_code: Some(429),
            message: "rate limited".to_string(),
            is_retryable: true,
            retry_after: Some(Duration::from_secs(5)),
        };
        assert!(err.is_retryable());
        assert!(!DialogueError::Other("parse".to_string()).is_retryable());
    }
}
