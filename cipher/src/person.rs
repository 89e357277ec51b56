//! People: agent identities that own a private memory.
//!
//! A person is in at most one conversation at a time and refers to it by
//! id. Operations that touch only the person's own memory live here;
//! joining and speaking need the conversation itself and are on
//! [`World`](crate::world::World).

use crate::error::Result;
use crate::generation::TextGenerator;
use crate::id::{ConversationId, PersonId};
use crate::memory::{Memory, MemoryEntry, MemoryKind};
use crate::message::Message;
use serde::Serialize;
use tracing::debug;

/// An agent with a name, an age and a private memory.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    id: PersonId,
    /// Display name, also used as the source of remembered messages
    pub name: String,
    /// Age in years
    pub age: u32,
    memory: Memory,
    current_conversation: Option<ConversationId>,
}

impl Person {
    /// Create a person with an empty memory and no conversation.
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            id: PersonId::new(),
            name: name.into(),
            age,
            memory: Memory::new(),
            current_conversation: None,
        }
    }

    /// This person's identifier.
    pub fn id(&self) -> PersonId {
        self.id
    }

    /// Read-only view of the memory log.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Append access to the memory log.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The conversation this person is currently in.
    pub fn current_conversation(&self) -> Option<ConversationId> {
        self.current_conversation
    }

    pub(crate) fn set_current_conversation(&mut self, conversation: Option<ConversationId>) {
        self.current_conversation = conversation;
    }

    /// Think about `context` and remember the thought.
    ///
    /// Consults memories relevant to `context` (and to the current
    /// conversation, if any). The thought itself is not tagged with a
    /// conversation.
    pub fn think(&mut self, context: &str) -> String {
        let relevant = self
            .memory
            .retrieve_relevant_memories(context, self.current_conversation)
            .len();

        let thought = format!("Thinking about {context} based on {relevant} relevant memories...");
        debug!(person = %self.name, relevant, "thought");

        self.memory
            .add_memory(MemoryKind::Thought, thought.clone(), None, None);
        thought
    }

    /// Take in a message: remember hearing it, then think about it.
    ///
    /// Always appends exactly two entries, `heard` then `thought`.
    pub fn listen(&mut self, message: &Message) -> String {
        self.memory.add_memory(
            MemoryKind::Heard,
            message.content.clone(),
            Some(message.speaker_name.clone()),
            self.current_conversation,
        );

        self.think(&format!("Response to {}", message.content))
    }

    /// Think about `context` using a text generator.
    ///
    /// The generated reply is remembered as a thought. If generation fails
    /// nothing is remembered.
    pub async fn think_with<G>(&mut self, context: &str, generator: &G) -> Result<String>
    where
        G: TextGenerator + ?Sized,
    {
        let prompt = {
            let relevant = self
                .memory
                .retrieve_relevant_memories(context, self.current_conversation);
            self.thought_prompt(context, &relevant)
        };

        let thought = generator.generate(&prompt).await?;
        debug!(person = %self.name, backend = generator.name(), "generated thought");

        self.memory
            .add_memory(MemoryKind::Thought, thought.clone(), None, None);
        Ok(thought)
    }

    fn thought_prompt(&self, context: &str, relevant: &[&MemoryEntry]) -> String {
        let mut prompt = format!(
            "You are {}, {} years old.\nThink briefly about: {context}\n\nRelevant memories:\n",
            self.name, self.age
        );

        if relevant.is_empty() {
            prompt.push_str("(none)\n");
        }
        for entry in relevant {
            match &entry.source {
                Some(source) => {
                    prompt.push_str(&format!("- [{}] {} (from {source})\n", entry.kind, entry.content))
                }
                None => prompt.push_str(&format!("- [{}] {}\n", entry.kind, entry.content)),
            }
        }

        prompt.push_str("\nReply with a single short thought, in the first person.");
        prompt
    }
}
