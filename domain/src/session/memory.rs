//! Conversation memory handle
//!
//! An optional pass-through value: the builder hands it to the orchestrator
//! only if the constructor declares a memory parameter. No persistence.

use std::sync::{Arc, Mutex, MutexGuard};

use super::entities::ChatMessage;

/// Shared, append-only conversation history
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        // A poisoned history is still a valid history
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the stored turns, oldest first
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    pub fn append(&self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.lock().extend(messages);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether two handles share the same history
    pub fn same_as(&self, other: &ConversationMemory) -> bool {
        Arc::ptr_eq(&self.messages, &other.messages)
    }
}
