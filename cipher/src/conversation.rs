//! Conversations: a shared, ordered message log plus a participant set.
//!
//! A conversation refers to its participants by id. Delivering a message to
//! every participant's memory needs access to those people, so the fan-out
//! lives in [`World::add_message`](crate::world::World::add_message); this
//! type only keeps the log and the membership.

use crate::id::{ConversationId, PersonId};
use crate::message::Message;
use serde::Serialize;

/// Default number of messages rendered by [`Conversation::get_context`].
pub const DEFAULT_RECENT_MESSAGES: usize = 5;

/// Context label used when none is given.
pub const DEFAULT_CONTEXT: &str = "general";

/// A conversation between people.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    id: ConversationId,
    /// What the conversation is about
    pub context: String,
    message_history: Vec<Message>,
    /// Unique, in join order
    participants: Vec<PersonId>,
}

impl Conversation {
    /// Create an empty conversation about `context`.
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            id: ConversationId::new(),
            context: context.into(),
            message_history: Vec::new(),
            participants: Vec::new(),
        }
    }

    /// The conversation's identifier, stable for its lifetime.
    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// Add a participant. Returns `false` if they were already present.
    pub fn add_participant(&mut self, person: PersonId) -> bool {
        if self.is_participant(person) {
            return false;
        }
        self.participants.push(person);
        true
    }

    /// Remove a participant. Returns `false` if they were not present.
    pub fn remove_participant(&mut self, person: PersonId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| *p != person);
        self.participants.len() != before
    }

    /// Check membership.
    pub fn is_participant(&self, person: PersonId) -> bool {
        self.participants.contains(&person)
    }

    /// Participants in join order.
    pub fn participants(&self) -> &[PersonId] {
        &self.participants
    }

    /// Append a message to the history.
    pub(crate) fn record(&mut self, message: Message) -> &Message {
        self.message_history.push(message);
        let last = self.message_history.len() - 1;
        &self.message_history[last]
    }

    /// Full message history in order.
    pub fn message_history(&self) -> &[Message] {
        &self.message_history
    }

    /// The last `n` messages, oldest first.
    pub fn get_recent_messages(&self, n: usize) -> &[Message] {
        let start = self.message_history.len().saturating_sub(n);
        &self.message_history[start..]
    }

    /// Describe the conversation and its most recent messages.
    pub fn get_context(&self) -> String {
        self.get_context_with(DEFAULT_RECENT_MESSAGES)
    }

    /// Like [`get_context`](Self::get_context) with a custom window.
    pub fn get_context_with(&self, recent: usize) -> String {
        let lines: Vec<String> = self
            .get_recent_messages(recent)
            .iter()
            .map(|m| m.to_string())
            .collect();

        format!(
            "Conversation about {}\nRecent messages:\n{}",
            self.context,
            lines.join("\n")
        )
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT)
    }
}
