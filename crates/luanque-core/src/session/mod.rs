//! Session domain: conversation messages, seeker intake and the
//! reading lifecycle state machine.

pub mod message;
pub mod model;

pub use message::{ConversationMessage, MessageRole};
pub use model::{SeekerIntake, Session, SessionPhase};
