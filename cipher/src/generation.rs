//! Pluggable text generation.
//!
//! The conversation model never talks to a language model directly. Anything
//! that can turn a prompt into plain text implements [`TextGenerator`];
//! parsing structured output is the caller's job.

use crate::config::CipherConfig;
use crate::error::{GenerationError, GenerationResult};
use async_trait::async_trait;
use futures::StreamExt;
use ollama::{ChatRequest, Format, Message, Ollama};
use std::sync::Arc;
use tracing::debug;

/// Generate text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a plain-text reply to `prompt`
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;

    /// Backend name, for logs and errors
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        (**self).generate(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        (**self).generate(prompt).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// [`TextGenerator`] backed by a local Ollama server
#[derive(Clone)]
pub struct OllamaGenerator {
    client: Ollama,
    json_output: bool,
    streaming: bool,
    temperature: Option<f32>,
}

impl OllamaGenerator {
    /// Wrap an existing client
    pub fn new(client: Ollama) -> Self {
        Self {
            client,
            json_output: false,
            streaming: false,
            temperature: None,
        }
    }

    /// Build a client from configuration
    pub fn from_config(config: &CipherConfig) -> Self {
        Self::new(Ollama::new(&config.ollama_host).with_model(&config.model))
    }

    /// Ask the server to constrain output to JSON
    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Receive the reply as a stream of deltas instead of one response
    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let mut request = ChatRequest::new(vec![Message::user(prompt)]);
        if self.json_output {
            request = request.with_format(Format::Json);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let text = if self.streaming {
            self.collect_stream(request).await?
        } else {
            let response = self.client.chat(request).await?;
            debug!(
                model = %response.model,
                prompt_tokens = response.usage.prompt_tokens,
                completion_tokens = response.usage.completion_tokens,
                "generation finished"
            );
            response.message.content
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse {
                backend: self.name().to_string(),
            });
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

impl OllamaGenerator {
    async fn collect_stream(&self, request: ChatRequest) -> GenerationResult<String> {
        let mut stream = self.client.chat_stream(request).await?;
        let mut text = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            text.push_str(&chunk.content);
            if let Some(usage) = chunk.usage {
                debug!(
                    model = %chunk.model,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "streamed generation finished"
                );
            }
        }
        Ok(text)
    }
}
