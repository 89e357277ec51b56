//! Runtime configuration.
//!
//! Values come from the environment; binaries load a `.env` file with
//! dotenvy before calling [`CipherConfig::from_env`].

use crate::conversation::DEFAULT_RECENT_MESSAGES;
use crate::error::{Error, Result};

/// Default Ollama server.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Configuration for the binaries and the Ollama-backed generator.
#[derive(Debug, Clone, PartialEq)]
pub struct CipherConfig {
    /// Base URL of the Ollama server.
    pub ollama_host: String,

    /// Model used for generation.
    pub model: String,

    /// How many recent messages a conversation context renders.
    pub recent_messages: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            recent_messages: DEFAULT_RECENT_MESSAGES,
        }
    }
}

impl CipherConfig {
    /// Read `OLLAMA_HOST`, `CIPHER_MODEL` and `CIPHER_RECENT_MESSAGES`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("OLLAMA_HOST").filter(|h| !h.trim().is_empty()) {
            let host = host.trim();
            config.ollama_host = if host.contains("://") {
                host.to_string()
            } else {
                format!("http://{host}")
            };
        }
        if let Some(model) = lookup("CIPHER_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = lookup("CIPHER_RECENT_MESSAGES") {
            config.recent_messages = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "CIPHER_RECENT_MESSAGES must be a non-negative integer, got '{raw}'"
                ))
            })?;
        }

        Ok(config)
    }

    /// Set the Ollama server.
    pub fn with_ollama_host(mut self, host: impl Into<String>) -> Self {
        self.ollama_host = host.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the recent message window.
    pub fn with_recent_messages(mut self, n: usize) -> Self {
        self.recent_messages = n;
        self
    }
}
