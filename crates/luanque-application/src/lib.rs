//! Use-case layer for LuanQue.
//!
//! Wires the instruction composer, memory store, responder arbiter and
//! dialogue service into the reading lifecycle.

pub mod consultation;

pub use consultation::{ConsultationUseCase, FALLBACK_REPLY, TurnOutcome};
