//! Minimal Ollama chat API client.
//!
//! This crate provides a focused client for a local Ollama server's
//! `/api/chat` endpoint with:
//! - Non-streaming and streaming completions
//! - JSON output mode
//! - Buffered NDJSON parsing for streaming responses

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

const DEFAULT_MODEL: &str = "llama3.2";

/// Errors returned by [`Ollama`].
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached or the connection dropped.
    #[error("could not reach Ollama: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Ollama returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The server answered with something that is not a chat response.
    #[error("unexpected Ollama response: {0}")]
    Parse(String),
}

/// Ollama API client.
#[derive(Clone)]
pub struct Ollama {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl Ollama {
    /// Create a new client talking to the server at `host`.
    pub fn new(host: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            host: host.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The default model used when a request does not name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The server base URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Send a chat request and return the full response.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, Error> {
        let api_request = self.build_api_request(&request, false);

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: extract_error_message(&body),
            });
        }

        let api_response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(api_response.into())
    }

    /// Send a chat request and stream the response.
    pub async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<ChatChunk, Error>> + Send>>, Error> {
        let api_request = self.build_api_request(&request, true);

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: extract_error_message(&body),
            });
        }

        // Lines, and characters within them, may be split across network
        // chunks, so buffer raw bytes and only decode complete lines
        let stream = response
            .bytes_stream()
            .scan(Vec::new(), |buffer: &mut Vec<u8>, result| {
                let chunks = match result {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        parse_ndjson_buffered(buffer)
                    }
                    Err(e) => vec![Err(Error::Network(e.to_string()))],
                };
                futures::future::ready(Some(chunks))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }

    fn build_api_request(&self, request: &ChatRequest, stream: bool) -> ApiChatRequest {
        let options = request
            .temperature
            .map(|temperature| ApiOptions { temperature });

        ApiChatRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            stream,
            format: request.format.map(|f| match f {
                Format::Json => "json".to_string(),
            }),
            options,
        }
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// Public types
// ============================================================================

/// A chat request to send to Ollama.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub format: Option<Format>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Create a new request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Constrained output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "system" => Role::System,
            "user" => Role::User,
            _ => Role::Assistant,
        }
    }
}

/// A completed chat response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub model: String,
    pub message: Message,
    pub done_reason: Option<String>,
    pub usage: Usage,
}

impl ChatResponse {
    /// The generated text.
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Token counts reported by the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// One line of a streaming response.
#[derive(Debug, Clone)]
pub struct ChatChunk {
    pub model: String,
    /// Text delta carried by this chunk.
    pub content: String,
    pub done: bool,
    /// Only present on the final chunk.
    pub usage: Option<Usage>,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ApiOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ApiOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    model: String,
    #[serde(default)]
    message: Option<ApiMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
    #[serde(default)]
    eval_count: Option<usize>,
}

impl ApiChatResponse {
    fn usage(&self) -> Usage {
        Usage {
            prompt_tokens: self.prompt_eval_count.unwrap_or(0),
            completion_tokens: self.eval_count.unwrap_or(0),
        }
    }
}

impl From<ApiChatResponse> for ChatResponse {
    fn from(api: ApiChatResponse) -> Self {
        let usage = api.usage();
        let message = api
            .message
            .map(|m| Message {
                role: Role::parse(&m.role),
                content: m.content,
            })
            .unwrap_or_else(|| Message {
                role: Role::Assistant,
                content: String::new(),
            });

        ChatResponse {
            model: api.model,
            message,
            done_reason: api.done_reason,
            usage,
        }
    }
}

impl From<ApiChatResponse> for ChatChunk {
    fn from(api: ApiChatResponse) -> Self {
        let usage = api.done.then(|| api.usage());
        ChatChunk {
            content: api.message.map(|m| m.content).unwrap_or_default(),
            model: api.model,
            done: api.done,
            usage,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Parse NDJSON chunks from a byte buffer, consuming complete lines and
/// leaving any trailing partial line for the next network chunk.
///
/// Only whole lines are decoded as UTF-8, so a character split between two
/// network chunks is reassembled before decoding.
fn parse_ndjson_buffered(buffer: &mut Vec<u8>) -> Vec<Result<ChatChunk, Error>> {
    let mut chunks = Vec::new();

    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=newline_pos).collect();

        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                chunks.push(Err(Error::Parse(format!("NDJSON line is not UTF-8: {e}"))));
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        if let Ok(err) = serde_json::from_str::<ApiErrorBody>(line) {
            chunks.push(Err(Error::Api {
                status: 200,
                message: err.error,
            }));
        } else {
            match serde_json::from_str::<ApiChatResponse>(line) {
                Ok(api) => chunks.push(Ok(api.into())),
                Err(e) => chunks.push(Err(Error::Parse(format!("NDJSON parse error: {e}")))),
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Ollama::new("http://localhost:11434/");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.host, "http://localhost:11434");
    }

    #[test]
    fn test_client_with_model() {
        let client = Ollama::new("http://localhost:11434").with_model("mistral");
        assert_eq!(client.model(), "mistral");
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![Message::user("Hello")])
            .with_format(Format::Json)
            .with_temperature(0.2);

        assert_eq!(request.format, Some(Format::Json));
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.model.is_none());
    }

    #[test]
    fn test_api_request_uses_default_model_and_format() {
        let client = Ollama::new("http://localhost:11434");
        let request = ChatRequest::new(vec![Message::user("Hi")]).with_format(Format::Json);

        let api = client.build_api_request(&request, false);
        let json = serde_json::to_value(&api).unwrap();

        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["format"], "json");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hi");
        assert!(json.get("options").is_none());

        let api = client.build_api_request(&request.with_temperature(0.5), true);
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["options"]["temperature"], 0.5);
    }

    #[test]
    fn test_ndjson_partial_line_is_kept() {
        let mut buffer = b"{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n{\"model\":\"llama3.2\",\"mess".to_vec();

        let chunks = parse_ndjson_buffered(&mut buffer);
        assert_eq!(chunks.len(), 1);
        let first = chunks.into_iter().next().unwrap().unwrap();
        assert_eq!(first.content, "Hel");
        assert!(!first.done);
        assert!(buffer.starts_with(b"{\"model\""));

        buffer.extend_from_slice(b"age\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"eval_count\":7}\n");
        let chunks = parse_ndjson_buffered(&mut buffer);
        let last = chunks.into_iter().next().unwrap().unwrap();
        assert!(last.done);
        assert_eq!(last.usage.unwrap().completion_tokens, 7);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_ndjson_character_split_between_chunks() {
        let line = "{\"model\":\"llama3.2\",\"message\":{\"role\":\"assistant\",\"content\":\"café\"},\"done\":false}\n";
        let bytes = line.as_bytes();
        // Cut between the two bytes of 'é'
        let split = line.find('é').unwrap() + 1;

        let mut buffer = bytes[..split].to_vec();
        assert!(parse_ndjson_buffered(&mut buffer).is_empty());

        buffer.extend_from_slice(&bytes[split..]);
        let chunks = parse_ndjson_buffered(&mut buffer);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks.into_iter().next().unwrap().unwrap().content, "café");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_ndjson_error_line() {
        let mut buffer = b"{\"error\":\"model not found\"}\n".to_vec();
        let chunks = parse_ndjson_buffered(&mut buffer);
        assert!(matches!(&chunks[0], Err(Error::Api { message, .. }) if message == "model not found"));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(extract_error_message("{\"error\":\"boom\"}"), "boom");
        assert_eq!(extract_error_message("plain text"), "plain text");
    }
}
