//! Instruction-context composition.
//!
//! Every new reading gets a freshly composed system instruction built
//! from the fixed diviner persona, optional operator-supplied overlays
//! and the accumulated memory transcript. Construction order is fixed
//! and append-only; memory is injected verbatim with no truncation or
//! summarization.

use crate::session::ConversationMessage;
use serde::{Deserialize, Serialize};

/// The fixed base persona of the automated diviner.
pub const BASE_PERSONA: &str = "Bạn là một thầy bói tình duyên uyên bác, huyền bí và sâu sắc dựa trên Kinh Dịch. Hãy luận giải quẻ trong hình ảnh mà người dùng cung cấp. Lời phán của bạn nên mang tính tích cực và đưa ra lời khuyên. Trả lời bằng tiếng Việt.";

/// Operator-supplied overlays layered onto the base persona.
///
/// Blank strings (after trimming) mean "not provided"; the composer
/// omits the corresponding block entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceOverlays {
    /// Additional persona instruction
    pub prompt_instruction: String,
    /// Reference knowledge to treat as the primary source
    pub knowledge_base: String,
}

impl GuidanceOverlays {
    /// The prompt overlay, or `None` when blank.
    pub fn prompt_overlay(&self) -> Option<&str> {
        non_blank(&self.prompt_instruction)
    }

    /// The knowledge overlay, or `None` when blank.
    pub fn knowledge_overlay(&self) -> Option<&str> {
        non_blank(&self.knowledge_base)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Composes the full system instruction for a new reading.
///
/// Order is fixed: base persona, then the additional-instruction block
/// (when the prompt overlay is non-blank), then the reference-knowledge
/// block (when the knowledge overlay is non-blank), then the prior
/// transcripts block (when memory is non-empty). Pure function of its
/// inputs; no side effects.
pub fn compose(
    base: &str,
    prompt_overlay: Option<&str>,
    knowledge_overlay: Option<&str>,
    memory: &[ConversationMessage],
) -> String {
    let mut instruction = base.to_string();

    if let Some(overlay) = prompt_overlay.and_then(non_blank) {
        instruction.push_str(&format!("\n\nCHỈ DẪN PROMPT BỔ SUNG: \"{}\"", overlay));
    }

    if let Some(overlay) = knowledge_overlay.and_then(non_blank) {
        instruction.push_str(&format!(
            "\n\nKIẾN THỨC NỀN BỔ SUNG (DÙNG LÀM TÀI LIỆU THAM KHẢO CHÍNH): \"{}\"",
            overlay
        ));
    }

    if !memory.is_empty() {
        let transcript = memory
            .iter()
            .map(|message| format!("{}: {}", message.role.label(), message.content))
            .collect::<Vec<_>>()
            .join("\n");
        instruction.push_str(&format!(
            "\n\nĐÂY LÀ LỊCH SỬ CÁC CUỘC TRÒ CHUYỆN TRƯỚC ĐÓ ĐỂ BẠN HỌC HỎI VÀ CẢI THIỆN. HÃY PHÂN TÍCH VÀ RÚT KINH NGHIỆM TỪ CHÚNG:\n---\n{}\n---",
            transcript
        ));
    }

    instruction
}
