//! Error types for the LuanQue engine.

use crate::dialogue::DialogueError;
use thiserror::Error;

/// A shared error type for the LuanQue workspace.
///
/// This provides typed, structured error variants so callers can
/// distinguish intake validation failures from dialogue-service failures.
#[derive(Error, Debug, Clone)]
pub enum LuanqueError {
    /// A required intake field is missing or blank
    #[error("Missing required intake field: {field}")]
    Validation { field: &'static str },

    /// Configuration error (secret file, API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dialogue-service failure
    #[error("Dialogue service error: {0}")]
    Dialogue(#[from] DialogueError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LuanqueError {
    /// Creates a Validation error for the given intake field.
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a dialogue-service error
    pub fn is_dialogue(&self) -> bool {
        matches!(self, Self::Dialogue(_))
    }
}

/// A type alias for `Result<T, LuanqueError>`.
pub type Result<T> = std::result::Result<T, LuanqueError>;
