//! Error types for the conversation model.
//!
//! Uses thiserror for ergonomic error definition.

use crate::id::{ConversationId, PersonId};

/// Main error type for the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A person tried to speak without an active conversation
    #[error("{name} is not in a conversation")]
    NotInConversation {
        /// The person who tried to speak
        person: PersonId,
        /// Their name, for the message
        name: String,
    },

    /// No person with this id is registered
    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    /// No conversation with this id is registered
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// A message was delivered on behalf of someone outside the conversation
    #[error("Person {person} is not a participant of conversation {conversation}")]
    NotAParticipant {
        /// The speaker of the rejected message
        person: PersonId,
        /// The conversation that rejected it
        conversation: ConversationId,
    },

    /// Text generation failed
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Agent recommendation failed
    #[error("Recommendation error: {0}")]
    Recommend(#[from] RecommendError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors from a text generation backend
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The Ollama backend failed
    #[error("Ollama: {0}")]
    Ollama(#[from] ollama::Error),

    /// The backend answered with nothing
    #[error("Backend '{backend}' returned an empty response")]
    EmptyResponse {
        /// Name of the backend
        backend: String,
    },

    /// A scripted or custom backend failed
    #[error("Backend '{backend}' failed: {reason}")]
    Backend {
        /// Name of the backend
        backend: String,
        /// What went wrong
        reason: String,
    },
}

/// Errors from the agent recommendation flow
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// The response was not the expected JSON object
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The response named an agent outside the catalog
    #[error("Unknown agent recommended: {0}")]
    UnknownAgent(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for generation calls
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;
