//! Provider implementations and shared dispatch plumbing.

pub mod anthropic;
pub mod openai;
pub mod streaming;
pub mod utils;

use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::callbacks::StreamCallbacks;
use crate::error::{Result, StreamError, truncate_for_preview};
use crate::message::Message;
use self::streaming::{SseFormat, process_stream};

/// Process-wide HTTP client (shared connection pool).
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Unified interface implemented by all streaming chat providers.
///
/// One `stream_chat` call is one stream: state (line buffer, accumulator) is
/// invocation-local, so a single streamer may serve many concurrent calls.
///
/// # Example
/// ```no_run
/// use llm_streamer::{ChatStreamer, Message, OpenAiStreamer, StreamCallbacks};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let streamer = OpenAiStreamer::new("sk-...");
/// let callbacks = StreamCallbacks::new()
///     .on_content(|fragment| print!("{}", fragment))
///     .on_error(|err| eprintln!("{}", err));
///
/// streamer
///     .stream_chat(
///         CancellationToken::new(),
///         &[Message::user("Hello!")],
///         callbacks,
///     )
///     .await;
/// # }
/// ```
#[async_trait]
pub trait ChatStreamer: Send + Sync {
    /// Streams one chat completion.
    ///
    /// Never returns a value and never panics: all results — incremental
    /// fragments, the final message, every failure — are delivered through
    /// `callbacks`. Cancelling `cancel` unblocks any in-flight network
    /// operation promptly and discards partially accumulated text.
    async fn stream_chat(
        &self,
        cancel: CancellationToken,
        messages: &[Message],
        callbacks: StreamCallbacks,
    );

    /// Provider name (used for logs and error messages).
    fn name(&self) -> &str;
}

/// Returns the shared HTTP client, building it on first use.
///
/// The client sets no request timeout: a streaming body legitimately stays
/// open for as long as the model generates, and the caller's cancellation
/// token is the only cutoff.
pub(crate) fn shared_http_client() -> Result<Client> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let user_agent = format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    let client = Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(StreamError::Request)?;
    Ok(HTTP_CLIENT.get_or_init(|| client).clone())
}

/// Sends one streaming request and drives the response to completion.
///
/// The driver half of the pipeline: encodes the body, posts it with the
/// provider's headers, branches on the response status, and on success hands
/// the body to [`process_stream`]. Returns `Err` for every terminal failure
/// that still needs reporting; on `Ok(())` the decoder has already delivered
/// the terminal `on_finish`. The response body is dropped on every exit path.
pub(crate) async fn dispatch_stream<F, Req>(
    client: &Client,
    endpoint: &str,
    headers: &[(&str, &str)],
    request_body: &Req,
    cancel: &CancellationToken,
    callbacks: &mut StreamCallbacks,
) -> Result<()>
where
    F: SseFormat,
    Req: Serialize,
{
    let body = serde_json::to_vec(request_body).map_err(StreamError::Encode)?;

    let mut req = client
        .post(endpoint)
        .header("Content-Type", "application/json")
        .body(body);
    for (key, value) in headers {
        req = req.header(*key, *value);
    }

    tracing::debug!("Sending {} streaming request to: {}", F::PROVIDER, endpoint);

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(StreamError::Cancelled),
        result = req.send() => result.map_err(classify_send_error)?,
    };

    let status = response.status();
    tracing::debug!("{} API response status: {}", F::PROVIDER, status);

    if !status.is_success() {
        // Surface the error body as diagnostic text; never decode it as SSE.
        // This read is cancellable too: the client has no timeout, so a
        // trickling error body must not pin the invocation.
        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            text = response.text() => text,
        };
        return Err(match text {
            Ok(body) => StreamError::Api {
                provider: F::PROVIDER,
                status,
                body: truncate_for_preview(&body),
            },
            Err(e) => StreamError::ApiBodyRead {
                provider: F::PROVIDER,
                status,
                source: e,
            },
        });
    }

    process_stream::<F>(response, cancel, callbacks).await
}

fn classify_send_error(e: reqwest::Error) -> StreamError {
    let error_type = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_builder() {
        "builder error"
    } else if e.is_request() {
        "request error"
    } else {
        "unknown"
    };
    tracing::debug!("Streaming request failed [{}]: {}", error_type, e);

    if e.is_builder() {
        // Malformed URL or an otherwise unconstructible request
        StreamError::Request(e)
    } else {
        StreamError::Network(e)
    }
}
