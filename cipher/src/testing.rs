//! Testing utilities.
//!
//! - `ScriptedGenerator` for deterministic tests without a model server

use crate::error::{GenerationError, GenerationResult};
use crate::generation::TextGenerator;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// A text generator that returns scripted replies in order.
///
/// Every prompt it receives is recorded so tests can inspect what was
/// asked. Once the script runs out, `generate` fails.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Create a generator with scripted replies.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue another reply.
    pub fn queue_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(reply.into());
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Replies not yet handed out.
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        lock(&self.prompts).push(prompt.to_string());

        lock(&self.replies)
            .pop_front()
            .ok_or_else(|| GenerationError::Backend {
                backend: self.name().to_string(),
                reason: "no more scripted replies".to_string(),
            })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// A poisoned lock only means another test thread panicked mid-push
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
