//! Private, append-only memory log for a single person.
//!
//! Every person owns exactly one [`Memory`]. Entries are appended and never
//! mutated or removed. A secondary index maps each conversation to the
//! positions of the entries that were tagged with it.
//!
//! Relevance retrieval is a literal, case-insensitive substring match.

use crate::id::{ConversationId, MemoryId};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// What kind of memory an entry records.
///
/// Open enumeration: unknown tags round-trip through [`MemoryKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MemoryKind {
    /// Something the person thought
    Thought,
    /// A message delivered through a conversation
    Conversation,
    /// A message the person explicitly listened to
    Heard,
    /// Anything the person experienced outside a conversation
    Experience,
    /// Any other tag
    Other(String),
}

impl MemoryKind {
    /// The string tag for this kind
    pub fn as_str(&self) -> &str {
        match self {
            MemoryKind::Thought => "thought",
            MemoryKind::Conversation => "conversation",
            MemoryKind::Heard => "heard",
            MemoryKind::Experience => "experience",
            MemoryKind::Other(tag) => tag.as_str(),
        }
    }
}

impl From<&str> for MemoryKind {
    fn from(tag: &str) -> Self {
        match tag {
            "thought" => MemoryKind::Thought,
            "conversation" => MemoryKind::Conversation,
            "heard" => MemoryKind::Heard,
            "experience" => MemoryKind::Experience,
            other => MemoryKind::Other(other.to_string()),
        }
    }
}

impl From<String> for MemoryKind {
    fn from(tag: String) -> Self {
        MemoryKind::from(tag.as_str())
    }
}

impl From<MemoryKind> for String {
    fn from(kind: MemoryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable record in a person's memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Unique identifier
    pub id: MemoryId,
    /// What kind of memory this is
    pub kind: MemoryKind,
    /// The remembered text
    pub content: String,
    /// Name of whoever the content came from, if anyone
    pub source: Option<String>,
    /// When the entry was appended, in UTC
    pub timestamp: DateTime<Utc>,
    /// Conversation this entry belongs to, if any
    pub conversation_id: Option<ConversationId>,
}

impl fmt::Display for MemoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            self.content
        )?;
        if let Some(source) = &self.source {
            write!(f, ", by {source}")?;
        }
        Ok(())
    }
}

/// Append-only memory log with a per-conversation index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Memory {
    entries: Vec<MemoryEntry>,
    /// Positions into `entries`, in append order, keyed by conversation
    conversation_index: HashMap<ConversationId, Vec<usize>>,
}

impl Memory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry stamped with the current time.
    ///
    /// When `conversation_id` is set, the entry's position is recorded in
    /// that conversation's index bucket.
    pub fn add_memory(
        &mut self,
        kind: impl Into<MemoryKind>,
        content: impl Into<String>,
        source: Option<String>,
        conversation_id: Option<ConversationId>,
    ) -> &MemoryEntry {
        let position = self.entries.len();
        let entry = MemoryEntry {
            id: MemoryId::new(),
            kind: kind.into(),
            content: content.into(),
            source,
            timestamp: Utc::now(),
            conversation_id,
        };

        debug!(
            kind = %entry.kind,
            position,
            conversation = ?conversation_id,
            "memory appended"
        );

        if let Some(id) = conversation_id {
            self.conversation_index.entry(id).or_default().push(position);
        }
        self.entries.push(entry);
        &self.entries[position]
    }

    /// Retrieve entries relevant to `context`.
    ///
    /// If `conversation_id` has indexed entries, all of them come first in
    /// log order, whatever their content. Then every entry in the whole log
    /// whose content contains `context` (case-insensitive) follows, in log
    /// order. An entry that satisfies both appears twice.
    pub fn retrieve_relevant_memories(
        &self,
        context: &str,
        conversation_id: Option<ConversationId>,
    ) -> Vec<&MemoryEntry> {
        let mut relevant: Vec<&MemoryEntry> = Vec::new();

        if let Some(positions) = conversation_id.and_then(|id| self.conversation_index.get(&id)) {
            relevant.extend(positions.iter().filter_map(|&pos| self.entries.get(pos)));
        }
        let scoped = relevant.len();

        let needle = context.to_lowercase();
        relevant.extend(
            self.entries
                .iter()
                .filter(|entry| entry.content.to_lowercase().contains(&needle)),
        );

        debug!(
            context,
            scoped,
            matched = relevant.len() - scoped,
            "memories retrieved"
        );
        relevant
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// Entries tagged with `conversation_id`, in append order.
    pub fn conversation_entries(&self, conversation_id: ConversationId) -> Vec<&MemoryEntry> {
        self.conversation_index
            .get(&conversation_id)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&pos| self.entries.get(pos))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries of a given kind, in append order.
    pub fn entries_of_kind(&self, kind: &MemoryKind) -> Vec<&MemoryEntry> {
        self.entries.iter().filter(|e| &e.kind == kind).collect()
    }

    /// Conversations this memory has entries for.
    pub fn conversations(&self) -> impl Iterator<Item = &ConversationId> {
        self.conversation_index.keys()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&MemoryEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been remembered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that every indexed position exists and points at an entry
    /// tagged with its bucket's conversation.
    pub fn index_is_consistent(&self) -> bool {
        self.conversation_index.iter().all(|(id, positions)| {
            positions.windows(2).all(|w| w[0] < w[1])
                && positions.iter().all(|&pos| {
                    self.entries
                        .get(pos)
                        .is_some_and(|entry| entry.conversation_id == Some(*id))
                })
        })
    }
}
