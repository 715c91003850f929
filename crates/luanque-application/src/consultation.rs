//! Consultation use case.
//!
//! `ConsultationUseCase` orchestrates one seeker's reading from intake
//! through conversation to memory fold-in. It owns the single active
//! session, the shared memory store, the operator guidance overlays and
//! the AI-enabled flag, and it is the only component that talks to the
//! dialogue service.

use luanque_core::arbiter::{self, ReplyPath, TurnSender};
use luanque_core::dialogue::{Attachment, DialogueConversation, DialogueService, TurnContent};
use luanque_core::instruction::{self, BASE_PERSONA, GuidanceOverlays};
use luanque_core::memory::MemoryStore;
use luanque_core::session::{ConversationMessage, SeekerIntake, Session, SessionPhase};
use luanque_core::{LuanqueError, Result};
use luanque_interaction::GeminiDialogueService;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Reply substituted into the transcript when the dialogue service
/// fails mid-conversation, so the conversation never breaks.
pub const FALLBACK_REPLY: &str = "Xin lỗi, đã có lỗi xảy ra, tôi không thể trả lời lúc này.";

/// Builds the opening turn text embedding the seeker's identity.
fn initial_prompt(seeker: &SeekerIntake) -> String {
    format!(
        "Tên tôi là {}, sinh năm {}, giới tính {}. Đây là quẻ tôi vừa gieo được, xin hãy luận giải về tình duyên cho tôi.",
        seeker.name, seeker.birth_year, seeker.gender
    )
}

/// Result of submitting a turn to an active reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// No active reading, or blank text; nothing was appended.
    Ignored,
    /// Seeker turn answered by the automated diviner (or the fallback
    /// reply when the service failed).
    Answered(ConversationMessage),
    /// Seeker turn recorded; the UI should surface that a live
    /// operator will answer.
    AwaitingOperator,
    /// Operator turn recorded; the appended message is the reply.
    OperatorReplied,
}

/// An active reading: the session plus its open conversation handle.
///
/// The handle is owned exclusively here for the session's Active
/// lifetime and dropped on the Ended transition.
struct ActiveReading {
    session: Session,
    conversation: Box<dyn DialogueConversation>,
}

/// Orchestrates the reading lifecycle and the human/AI handoff.
///
/// One consultation is active at a time; the mutex around it is held
/// across the dialogue-service call, so a second submission waits for
/// the in-flight turn instead of pipelining. The memory store and the
/// AI-enabled flag are process-wide and unaffected by an in-flight
/// turn.
pub struct ConsultationUseCase {
    dialogue_service: Arc<dyn DialogueService>,
    memory: Arc<MemoryStore>,
    guidance: RwLock<GuidanceOverlays>,
    ai_enabled: AtomicBool,
    active: Mutex<Option<ActiveReading>>,
}

impl ConsultationUseCase {
    /// Creates a new use case over the given dialogue service and
    /// memory store. The AI responder starts enabled.
    pub fn new(dialogue_service: Arc<dyn DialogueService>, memory: Arc<MemoryStore>) -> Self {
        Self {
            dialogue_service,
            memory,
            guidance: RwLock::new(GuidanceOverlays::default()),
            ai_enabled: AtomicBool::new(true),
            active: Mutex::new(None),
        }
    }

    /// Builds a use case backed by the Gemini service configured in
    /// secret.json, with a fresh memory store.
    pub fn try_from_config() -> Result<Self> {
        let service = GeminiDialogueService::try_from_config()?;
        Ok(Self::new(Arc::new(service), Arc::new(MemoryStore::new())))
    }

    /// Starts a new reading.
    ///
    /// Validates the intake, composes a fresh instruction context from
    /// the base persona, the operator overlays and the current memory,
    /// opens a dialogue and sends the initial multimodal turn. On
    /// success the reading becomes Active and the diviner's first
    /// reply is returned.
    ///
    /// # Errors
    ///
    /// - `Validation` if an intake field is missing; nothing is created.
    /// - `Dialogue` if the service fails to open or to answer the
    ///   initial turn; nothing is retained and the form can be
    ///   resubmitted.
    /// - `Internal` if a reading is already in progress.
    pub async fn start_reading(
        &self,
        seeker: SeekerIntake,
        cast_image: Option<Attachment>,
    ) -> Result<ConversationMessage> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(LuanqueError::internal("A reading is already in progress"));
        }

        let mut session = Session::begin(seeker, cast_image)?;

        let memory = self.memory.snapshot().await;
        let guidance = self.guidance.read().await;
        let instruction_context = instruction::compose(
            BASE_PERSONA,
            guidance.prompt_overlay(),
            guidance.knowledge_overlay(),
            &memory,
        );
        drop(guidance);

        let mut conversation = self
            .dialogue_service
            .open(&instruction_context)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Failed to open dialogue for new reading");
                LuanqueError::from(err)
            })?;

        let opening = TurnContent::multimodal(
            initial_prompt(&session.seeker),
            session.cast_image.clone(),
        );
        let reply_text = conversation.send(opening).await.map_err(|err| {
            tracing::error!(error = %err, "Initial dialogue turn failed, reading not started");
            LuanqueError::from(err)
        })?;

        let reply = ConversationMessage::ai(reply_text);
        session.record(reply.clone());
        tracing::info!(session_id = %session.id, "Reading started");

        *active = Some(ActiveReading {
            session,
            conversation,
        });
        Ok(reply)
    }

    /// Submits one turn to the active reading.
    ///
    /// The turn is appended to the transcript immediately; what happens
    /// next is decided by the responder arbiter. A dialogue-service
    /// failure on a seeker turn is absorbed as [`FALLBACK_REPLY`] and
    /// never surfaces as an error.
    pub async fn submit_turn(&self, sender: TurnSender, text: &str) -> TurnOutcome {
        if text.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        let mut guard = self.active.lock().await;
        let Some(reading) = guard.as_mut() else {
            return TurnOutcome::Ignored;
        };

        // Optimistic echo
        reading
            .session
            .record(ConversationMessage::new(sender.role(), text));

        match arbiter::route_turn(sender, self.is_ai_enabled()) {
            ReplyPath::Automated => {
                let reply = match reading.conversation.send(TurnContent::text(text)).await {
                    Ok(response_text) => ConversationMessage::ai(response_text),
                    Err(err) => {
                        tracing::warn!(
                            session_id = %reading.session.id,
                            error = %err,
                            "Dialogue turn failed, substituting fallback reply"
                        );
                        ConversationMessage::ai(FALLBACK_REPLY)
                    }
                };
                reading.session.record(reply.clone());
                TurnOutcome::Answered(reply)
            }
            ReplyPath::AwaitOperator => TurnOutcome::AwaitingOperator,
            ReplyPath::OperatorDirect => TurnOutcome::OperatorReplied,
        }
    }

    /// Ends the active reading, folding its transcript into the
    /// memory store. A no-op when no reading is active.
    ///
    /// The conversation handle is dropped without any close call to
    /// the dialogue service.
    pub async fn end_reading(&self) {
        let mut guard = self.active.lock().await;
        let Some(mut reading) = guard.take() else {
            return;
        };

        let transcript = reading.session.end();
        tracing::info!(
            session_id = %reading.session.id,
            messages = transcript.len(),
            "Reading ended, folding transcript into memory"
        );
        self.memory.append(transcript).await;
    }

    /// Enables or disables the automated responder.
    ///
    /// Affects only the routing of subsequent seeker turns.
    pub fn set_ai_enabled(&self, enabled: bool) {
        self.ai_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether the automated responder currently answers seeker turns.
    pub fn is_ai_enabled(&self) -> bool {
        self.ai_enabled.load(Ordering::SeqCst)
    }

    /// Replaces the operator guidance overlays.
    ///
    /// Takes effect at the next reading start; an open dialogue keeps
    /// the instruction context it was opened with.
    pub async fn set_guidance(&self, overlays: GuidanceOverlays) {
        *self.guidance.write().await = overlays;
    }

    /// Current operator guidance overlays.
    pub async fn guidance(&self) -> GuidanceOverlays {
        self.guidance.read().await.clone()
    }

    /// Clears the long-term memory unconditionally.
    pub async fn clear_memory(&self) {
        self.memory.clear().await;
    }

    /// Read-only copy of the long-term memory.
    pub async fn memory_snapshot(&self) -> Vec<ConversationMessage> {
        self.memory.snapshot().await
    }

    /// Read-only copy of the active reading's transcript; empty when
    /// no reading is active.
    pub async fn transcript(&self) -> Vec<ConversationMessage> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|reading| reading.session.transcript.clone())
            .unwrap_or_default()
    }

    /// Current lifecycle phase from the caller's perspective.
    pub async fn phase(&self) -> SessionPhase {
        if self.active.lock().await.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Collecting
        }
    }
}
