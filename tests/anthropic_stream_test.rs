//! End-to-end tests for the Anthropic streaming pipeline against a mock server.

use std::sync::{Arc, Mutex};

use llm_streamer::{AnthropicStreamer, ChatStreamer, Message, StreamCallbacks};
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn ensure_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[derive(Default)]
struct Recorded {
    contents: Vec<String>,
    finished: Option<String>,
    errors: Vec<String>,
}

fn recording() -> (StreamCallbacks, Arc<Mutex<Recorded>>) {
    let rec = Arc::new(Mutex::new(Recorded::default()));
    let cb = StreamCallbacks::new()
        .on_content({
            let rec = rec.clone();
            move |s| rec.lock().unwrap().contents.push(s.to_string())
        })
        .on_finish({
            let rec = rec.clone();
            move |m| rec.lock().unwrap().finished = Some(m)
        })
        .on_error({
            let rec = rec.clone();
            move |e| rec.lock().unwrap().errors.push(e.to_string())
        });
    (cb, rec)
}

#[tokio::test]
async fn test_stream_chat_normal_completion() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let body = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\"}}\n",
        "\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n",
        "\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" there\"}}\n",
        "\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n",
        "\n",
    );
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-ant-test")
        .match_header("anthropic-version", "2023-06-01")
        .match_header("Content-Type", "application/json")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let streamer = AnthropicStreamer::new("sk-ant-test").with_endpoint(&server.url());
    let (cb, rec) = recording();

    streamer
        .stream_chat(CancellationToken::new(), &[Message::user("hi")], cb)
        .await;

    let rec = rec.lock().unwrap();
    assert_eq!(rec.contents, vec!["Hi", " there"]);
    assert_eq!(rec.finished.as_deref(), Some("Hi there"));
    assert!(rec.errors.is_empty());
    mock.assert_async().await;
}

/// Unset model is substituted with the documented default in the request body.
#[tokio::test]
async fn test_stream_chat_default_model_substitution() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-opus-20240229",
            "max_tokens": 1024,
            "stream": true,
        })))
        .with_status(200)
        .with_body("data: {\"type\":\"message_stop\"}\n")
        .create_async()
        .await;

    let streamer = AnthropicStreamer::new("sk-ant-test").with_endpoint(&server.url());
    let (cb, rec) = recording();

    streamer
        .stream_chat(CancellationToken::new(), &[Message::user("hi")], cb)
        .await;

    assert_eq!(rec.lock().unwrap().finished.as_deref(), Some(""));
    mock.assert_async().await;
}

/// The connection closing without message_stop still completes successfully.
#[tokio::test]
async fn test_stream_chat_finishes_on_clean_close() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let body =
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"partial\"}}\n";
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let streamer = AnthropicStreamer::new("sk-ant-test").with_endpoint(&server.url());
    let (cb, rec) = recording();

    streamer
        .stream_chat(CancellationToken::new(), &[Message::user("hi")], cb)
        .await;

    let rec = rec.lock().unwrap();
    assert_eq!(rec.contents, vec!["partial"]);
    assert_eq!(rec.finished.as_deref(), Some("partial"));
    assert!(rec.errors.is_empty());
    mock.assert_async().await;
}

/// Non-success status: one error carrying status and body, no finish.
#[tokio::test]
async fn test_stream_chat_api_error_surfaces_body() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(529)
        .with_body(r#"{"type":"error","error":{"type":"overloaded_error"}}"#)
        .create_async()
        .await;

    let streamer = AnthropicStreamer::new("sk-ant-test").with_endpoint(&server.url());
    let (cb, rec) = recording();

    streamer
        .stream_chat(CancellationToken::new(), &[Message::user("hi")], cb)
        .await;

    let rec = rec.lock().unwrap();
    assert_eq!(rec.errors.len(), 1);
    assert!(rec.errors[0].contains("529"));
    assert!(rec.errors[0].contains("overloaded_error"));
    assert_eq!(rec.finished, None);
    mock.assert_async().await;
}

/// Empty API key: exactly one error, no network call.
#[tokio::test]
async fn test_stream_chat_empty_api_key_no_request() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .expect(0)
        .create_async()
        .await;

    let streamer = AnthropicStreamer::new("").with_endpoint(&server.url());
    let (cb, rec) = recording();

    streamer
        .stream_chat(CancellationToken::new(), &[Message::user("hi")], cb)
        .await;

    let rec = rec.lock().unwrap();
    assert_eq!(rec.errors.len(), 1);
    assert!(rec.errors[0].contains("API key"));
    assert_eq!(rec.finished, None);
    mock.assert_async().await;
}
