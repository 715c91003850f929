//! Reading session domain model.
//!
//! A `Session` is one seeker's intake-through-conversation lifecycle
//! instance. It is only ever constructed through validated intake, so a
//! `Session` value in `Active` phase always carries a complete identity
//! and a cast image.

use crate::dialogue::Attachment;
use crate::error::{LuanqueError, Result};
use crate::session::message::ConversationMessage;
use serde::{Deserialize, Serialize};

/// Identity details the seeker submits on the intake form.
///
/// All three fields are required and must be non-blank after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerIntake {
    /// Display name of the seeker
    pub name: String,
    /// Birth year as entered on the form
    pub birth_year: String,
    /// Selected gender
    pub gender: String,
}

impl SeekerIntake {
    /// Validates the identity fields.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LuanqueError::validation("name"));
        }
        if self.birth_year.trim().is_empty() {
            return Err(LuanqueError::validation("birth_year"));
        }
        if self.gender.trim().is_empty() {
            return Err(LuanqueError::validation("gender"));
        }
        Ok(())
    }
}

/// Lifecycle phase of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Accumulating intake fields; no session value exists yet.
    Collecting,
    /// A dialogue is open and the transcript accepts appended messages.
    Active,
    /// The reading was explicitly ended; terminal for this instance.
    Ended,
}

/// A reading session in the domain layer.
///
/// Created only by [`Session::begin`], which validates the intake. The
/// transcript is an ordered sequence of [`ConversationMessage`]; it is
/// moved out, not destroyed, when the session ends so it can be folded
/// into long-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Validated seeker identity
    pub seeker: SeekerIntake,
    /// The uploaded divination-cast image
    pub cast_image: Attachment,
    /// Ordered conversation transcript
    pub transcript: Vec<ConversationMessage>,
    /// Current lifecycle phase
    pub phase: SessionPhase,
    /// Timestamp when the session was created (ISO 8601 format)
    pub started_at: String,
}

impl Session {
    /// Validates the intake and begins an `Active` session with an
    /// empty transcript.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if any identity field is blank or
    /// the cast image is missing or empty. No partial session is
    /// created on failure.
    pub fn begin(seeker: SeekerIntake, cast_image: Option<Attachment>) -> Result<Self> {
        seeker.validate()?;
        let cast_image = match cast_image {
            Some(image) if !image.is_empty() => image,
            _ => return Err(LuanqueError::validation("cast_image")),
        };

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            seeker,
            cast_image,
            transcript: Vec::new(),
            phase: SessionPhase::Active,
            started_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Appends a message to the transcript.
    ///
    /// Only an `Active` session accepts messages; appends to an ended
    /// session are ignored.
    pub fn record(&mut self, message: ConversationMessage) {
        if self.phase == SessionPhase::Active {
            self.transcript.push(message);
        }
    }

    /// Ends the session and moves the transcript out.
    ///
    /// The returned messages preserve conversation order; the session
    /// itself is left in the terminal `Ended` phase.
    pub fn end(&mut self) -> Vec<ConversationMessage> {
        self.phase = SessionPhase::Ended;
        std::mem::take(&mut self.transcript)
    }

    /// Whether the session is in the `Active` phase.
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::message::MessageRole;

    fn intake() -> SeekerIntake {
        SeekerIntake {
            name: "Hoa".to_string(),
            birth_year: "1998".to_string(),
            gender: "Nữ".to_string(),
        }
    }

    fn image() -> Attachment {
        Attachment::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    #[test]
    fn test_begin_with_valid_intake() {
        let session = Session::begin(intake(), Some(image())).unwrap();
        assert_eq!(session.phase, SessionPhase::Active);
        assert!(session.transcript.is_empty());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn test_begin_rejects_blank_name() {
        let mut seeker = intake();
        seeker.name = "   ".to_string();
        let err = Session::begin(seeker, Some(image())).unwrap_err();
        assert!(matches!(err, LuanqueError::Validation { field: "name" }));
    }

    #[test]
    fn test_begin_rejects_blank_birth_year() {
        let mut seeker = intake();
        seeker.birth_year = String::new();
        let err = Session::begin(seeker, Some(image())).unwrap_err();
        assert!(matches!(
            err,
            LuanqueError::Validation { field: "birth_year" }
        ));
    }

    #[test]
    fn test_begin_rejects_missing_gender() {
        let mut seeker = intake();
        seeker.gender = String::new();
        let err = Session::begin(seeker, Some(image())).unwrap_err();
        assert!(matches!(err, LuanqueError::Validation { field: "gender" }));
    }

    #[test]
    fn test_begin_rejects_missing_image() {
        let err = Session::begin(intake(), None).unwrap_err();
        assert!(matches!(
            err,
            LuanqueError::Validation { field: "cast_image" }
        ));
    }

    #[test]
    fn test_begin_rejects_empty_image() {
        let empty = Attachment::new(Vec::new(), "image/png");
        let err = Session::begin(intake(), Some(empty)).unwrap_err();
        assert!(matches!(
            err,
            LuanqueError::Validation { field: "cast_image" }
        ));
    }

    #[test]
    fn test_record_preserves_order() {
        let mut session = Session::begin(intake(), Some(image())).unwrap();
        session.record(ConversationMessage::ai("Lời giải A"));
        session.record(ConversationMessage::user("Hỏi thêm"));

        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[0].role, MessageRole::Ai);
        assert_eq!(session.transcript[1].role, MessageRole::User);
    }

    #[test]
    fn test_end_moves_transcript_out() {
        let mut session = Session::begin(intake(), Some(image())).unwrap();
        session.record(ConversationMessage::ai("Lời giải A"));
        session.record(ConversationMessage::user("Hỏi thêm"));

        let transcript = session.end();
        assert_eq!(transcript.len(), 2);
        assert_eq!(session.phase, SessionPhase::Ended);
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn test_ended_session_ignores_appends() {
        let mut session = Session::begin(intake(), Some(image())).unwrap();
        session.end();
        session.record(ConversationMessage::user("Muộn rồi"));
        assert!(session.transcript.is_empty());
    }
}
