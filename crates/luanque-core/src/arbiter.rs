//! Responder arbitration.
//!
//! Decides, per inbound turn, which of the three reply paths applies:
//! automated (dialogue service), suppressed pending a live operator, or
//! direct operator reply. All three share one transcript.

use crate::session::MessageRole;

/// Who submitted a turn. Only the seeker and the live operator can
/// author turns; the automated diviner only ever replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSender {
    /// The seeker (end user)
    User,
    /// The live operator
    Operator,
}

impl TurnSender {
    /// The transcript role for messages authored by this sender.
    pub fn role(&self) -> MessageRole {
        match self {
            TurnSender::User => MessageRole::User,
            TurnSender::Operator => MessageRole::Operator,
        }
    }
}

/// The fate of a submitted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPath {
    /// Invoke the dialogue service for an automated reply.
    Automated,
    /// Record the turn but generate nothing; a live operator will
    /// answer later.
    AwaitOperator,
    /// The operator turn is itself the reply; never routed to the
    /// dialogue service.
    OperatorDirect,
}

/// Routes a turn to its reply path.
///
/// A seeker turn goes to the dialogue service only while the AI is
/// enabled; an operator turn is always a direct reply, regardless of
/// the flag.
pub fn route_turn(sender: TurnSender, ai_enabled: bool) -> ReplyPath {
    match sender {
        TurnSender::Operator => ReplyPath::OperatorDirect,
        TurnSender::User if ai_enabled => ReplyPath::Automated,
        TurnSender::User => ReplyPath::AwaitOperator,
    }
}
