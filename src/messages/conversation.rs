use super::types::{ChatMessage, Role};

/// Append-only chat history owned by a single chat controller.
///
/// Messages are never mutated once pushed. Callers hand the provider a
/// [`snapshot`](Conversation::snapshot) rather than a reference, so an
/// in-flight request never observes later appends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> usize {
        self.push(ChatMessage::user(content))
    }

    pub fn push_model(&mut self, content: impl Into<String>) -> usize {
        self.push(ChatMessage::model(content))
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// True when the newest message was written by the user, i.e. the
    /// history is ready to be sent for completion.
    pub fn awaits_reply(&self) -> bool {
        matches!(self.last(), Some(m) if m.role == Role::User)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
