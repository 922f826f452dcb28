//! Conversation history contract.
//!
//! The orchestrator never owns the conversation — it reads a snapshot before
//! each inference round and appends assistant/tool-result messages as they
//! are produced. Persistence (if any) lives behind this trait.

use parking_lot::Mutex;

use crate::messages::Message;

/// Externally-owned conversation history.
///
/// Implementations must be safe to share across the orchestrator and
/// concurrently-executing tools.
pub trait ConversationHistory: Send + Sync {
    /// Append one message.
    fn append(&self, message: Message);

    /// Append several messages, preserving order.
    fn extend(&self, messages: Vec<Message>);

    /// A copy of the full history, in order.
    fn snapshot(&self) -> Vec<Message>;

    /// Number of messages.
    fn len(&self) -> usize;

    /// Whether the history is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory history backed by a mutex-guarded vector.
#[derive(Default)]
pub struct InMemoryHistory {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history seeded with existing messages.
    #[must_use]
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }
}

impl ConversationHistory for InMemoryHistory {
    fn append(&self, message: Message) {
        self.messages.lock().push(message);
    }

    fn extend(&self, messages: Vec<Message>) {
        self.messages.lock().extend(messages);
    }

    fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    fn len(&self) -> usize {
        self.messages.lock().len()
    }
}
