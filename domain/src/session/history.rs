//! Conversation history for one Oracle session

use super::entities::Message;

/// Ordered, append-only record of the turns of one session.
///
/// The only destructive operation is [`clear`](Self::clear), which empties
/// the whole history at once. Readers never get a reference into the live
/// sequence for a model call; they take a [`snapshot`](Self::snapshot).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single turn.
    pub fn append(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    /// Append a completed exchange: the user turn followed by the assistant turn.
    pub fn append_exchange(&mut self, user: Message, assistant: Message) {
        self.turns.reserve(2);
        self.turns.push(user);
        self.turns.push(assistant);
    }

    /// Point-in-time copy of all turns, in chronological order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.turns.clone()
    }

    /// Borrow the turns (for display).
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
