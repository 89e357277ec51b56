//! HTTP-level tests for the Ollama client against a mock server.

use futures::StreamExt;
use ollama::{ChatRequest, Error, Format, Message, Ollama, Role};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn chat_returns_assistant_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.2",
            "stream": false,
            "format": "json"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2",
            "created_at": "2024-10-01T12:00:00Z",
            "message": { "role": "assistant", "content": "{\"ok\": true}" },
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 12,
            "eval_count": 5
        })))
        .mount(&server)
        .await;

    let client = Ollama::new(server.uri());
    let response = client
        .chat(ChatRequest::new(vec![Message::user("Hello")]).with_format(Format::Json))
        .await
        .expect("chat should succeed");

    assert_eq!(response.message.role, Role::Assistant);
    assert_eq!(response.text(), "{\"ok\": true}");
    assert_eq!(response.done_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.prompt_tokens, 12);
    assert_eq!(response.usage.completion_tokens, 5);
}

#[tokio::test]
async fn chat_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "model 'nope' not found" })),
        )
        .mount(&server)
        .await;

    let client = Ollama::new(server.uri()).with_model("nope");
    let err = client
        .chat(ChatRequest::new(vec![Message::user("Hello")]))
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "model 'nope' not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn chat_stream_yields_deltas_in_order() {
    let server = MockServer::start().await;

    let body = [
        json!({"model": "llama3.2", "message": {"role": "assistant", "content": "Hello"}, "done": false}),
        json!({"model": "llama3.2", "message": {"role": "assistant", "content": ", world"}, "done": false}),
        json!({"model": "llama3.2", "message": {"role": "assistant", "content": ""}, "done": true, "eval_count": 3}),
    ]
    .iter()
    .map(|v| format!("{v}\n"))
    .collect::<String>();

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = Ollama::new(server.uri());
    let mut stream = client
        .chat_stream(ChatRequest::new(vec![Message::user("Say hello")]))
        .await
        .expect("stream should open");

    let mut text = String::new();
    let mut finished = false;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("chunk should parse");
        text.push_str(&chunk.content);
        if chunk.done {
            finished = true;
            assert_eq!(chunk.usage.map(|u| u.completion_tokens), Some(3));
        }
    }

    assert!(finished);
    assert_eq!(text, "Hello, world");
}
