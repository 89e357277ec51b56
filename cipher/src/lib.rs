//! # Cipher
//!
//! A small simulation of people exchanging messages in conversations, each
//! keeping a private, append-only memory.
//!
//! ## Core Concepts
//!
//! - **Memory**: per-person log of timestamped entries, indexed by conversation
//! - **Message**: one immutable utterance
//! - **Conversation**: an ordered message log plus a participant set
//! - **Person**: an identity that owns a memory and is in at most one conversation
//! - **World**: the registry that owns people and conversations and routes
//!   messages between them
//!
//! Anything that needs a language model goes through [`TextGenerator`],
//! for example the agent recommender in [`recommend`].
//!
//! ## Example
//!
//! ```rust
//! use cipher::prelude::*;
//!
//! let mut world = World::new();
//! let alice = world.create_person("Alice", 25);
//! let bob = world.create_person("Bob", 30);
//! let chat = world.create_conversation("AI and consciousness");
//!
//! world.join_conversation(alice, chat)?;
//! world.join_conversation(bob, chat)?;
//!
//! let message = world.speak(alice, "What do you think about artificial consciousness?")?;
//! world.listen(bob, &message)?;
//!
//! assert_eq!(world.person(bob)?.memory().len(), 3);
//! # Ok::<(), cipher::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod conversation;
pub mod error;
pub mod generation;
pub mod id;
pub mod memory;
pub mod message;
pub mod person;
pub mod recommend;
pub mod testing;
pub mod world;

pub use config::CipherConfig;
pub use error::{Error, GenerationError, RecommendError, Result};
pub use generation::{OllamaGenerator, TextGenerator};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::CipherConfig;
    pub use crate::conversation::Conversation;
    pub use crate::error::*;
    pub use crate::generation::{OllamaGenerator, TextGenerator};
    pub use crate::id::*;
    pub use crate::memory::{Memory, MemoryEntry, MemoryKind};
    pub use crate::message::Message;
    pub use crate::person::Person;
    pub use crate::recommend::{AgentCatalog, AgentProfile, AgentRecommender, Recommendation};
    pub use crate::world::World;
}
