//! External dialogue-service integrations for LuanQue.
//!
//! Currently provides the Gemini REST backend; the engine only ever
//! talks to the traits in `luanque_core::dialogue`.

pub mod config;
pub mod gemini_dialogue;

pub use gemini_dialogue::{DEFAULT_GEMINI_MODEL, GeminiDialogueService};
