//! Long-term memory shared across readings.
//!
//! Ended sessions fold their transcripts here, and the instruction
//! composer injects a snapshot into every new reading's context.
//! Append-only except for the explicit clear-all operation; memory
//! lifetime is one running process.

use crate::session::ConversationMessage;
use tokio::sync::RwLock;

/// Process-wide ordered log of prior reading transcripts.
#[derive(Default)]
pub struct MemoryStore {
    messages: RwLock<Vec<ConversationMessage>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends all messages to the end, preserving relative order.
    ///
    /// A no-op when the input is empty.
    pub async fn append(&self, messages: Vec<ConversationMessage>) {
        if messages.is_empty() {
            return;
        }
        self.messages.write().await.extend(messages);
    }

    /// Empties the store unconditionally.
    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }

    /// Returns an owned copy of the current contents.
    pub async fn snapshot(&self) -> Vec<ConversationMessage> {
        self.messages.read().await.clone()
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Whether the store holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageRole;

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = MemoryStore::new();
        store
            .append(vec![
                ConversationMessage::ai("Lời giải A"),
                ConversationMessage::user("Hỏi thêm"),
                ConversationMessage::operator("Trả lời trực tiếp"),
            ])
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].role, MessageRole::Ai);
        assert_eq!(snapshot[1].role, MessageRole::User);
        assert_eq!(snapshot[2].role, MessageRole::Operator);
    }

    #[tokio::test]
    async fn test_append_empty_is_noop() {
        let store = MemoryStore::new();
        store.append(Vec::new()).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_append_accumulates_across_sessions() {
        let store = MemoryStore::new();
        store.append(vec![ConversationMessage::ai("Quẻ một")]).await;
        store.append(vec![ConversationMessage::ai("Quẻ hai")]).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].content, "Quẻ một");
        assert_eq!(snapshot[1].content, "Quẻ hai");
    }

    #[tokio::test]
    async fn test_clear_empties_store() {
        let store = MemoryStore::new();
        store.append(vec![ConversationMessage::ai("Quẻ")]).await;
        store.clear().await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let store = MemoryStore::new();
        store.append(vec![ConversationMessage::ai("Quẻ")]).await;

        let snapshot = store.snapshot().await;
        store.clear().await;
        assert_eq!(snapshot.len(), 1);
    }
}
