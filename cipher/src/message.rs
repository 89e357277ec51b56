//! Messages exchanged in a conversation.
//!
//! A message is immutable once created. It refers to its speaker by id, not
//! by ownership, and keeps a copy of the speaker's name for rendering.

use crate::id::{MessageId, PersonId};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One utterance in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// What was said
    pub content: String,
    /// Who said it
    pub speaker: PersonId,
    /// The speaker's name at the time of speaking
    pub speaker_name: String,
    /// When the message was created, in UTC
    pub timestamp: DateTime<Utc>,
    /// Optional context tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Message {
    /// Create a new message stamped with the current time
    pub fn new(speaker: PersonId, speaker_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            speaker,
            speaker_name: speaker_name.into(),
            timestamp: Utc::now(),
            context: None,
        }
    }

    /// Attach a context tag
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Override the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.speaker_name,
            self.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            self.content
        )
    }
}
