//! SSE (Server-Sent Events) decoding module
//!
//! Parses streaming chat-completion responses into provider-agnostic content
//! events. One generic decoder handles both wire formats; the per-provider
//! differences (event schema, completion sentinel) live behind [`SseFormat`].

pub mod anthropic;
pub mod openai;

use futures_util::StreamExt;
use reqwest::Response;
use tokio_util::sync::CancellationToken;

use crate::callbacks::StreamCallbacks;
use crate::error::{Result, StreamError};

/// Parse an SSE line and extract the data payload
pub(crate) fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix("data: ")
}

/// Provider-agnostic event decoded from one `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Non-empty text fragment to append to the message.
    Delta(String),
    /// Explicit end-of-stream event.
    Stop,
    /// Event carrying nothing meaningful for content streaming.
    Ignore,
}

/// Wire-format adapter implemented once per provider.
pub trait SseFormat {
    /// Provider name used in logs and error messages.
    const PROVIDER: &'static str;

    /// Literal payload that terminates the stream without being JSON
    /// (`[DONE]` for OpenAI; Anthropic has none).
    const DONE_SENTINEL: Option<&'static str>;

    /// Decodes one `data:` payload into an [`SseEvent`].
    fn parse_event(payload: &str) -> serde_json::Result<SseEvent>;
}

/// Drives the streaming response body to completion.
///
/// Reads the body in arbitrary-sized chunks, reassembles logical lines across
/// read boundaries, and dispatches decoded events to `callbacks`:
/// - content deltas are appended to the accumulator and forwarded
///   incrementally through `on_content`;
/// - an explicit terminator (typed stop event or [`SseFormat::DONE_SENTINEL`])
///   finishes the stream with the accumulated text;
/// - a payload that fails to deserialize is reported through `on_error` and
///   the decoder resumes at the next line;
/// - a stream that ends cleanly without a terminator still finishes
///   successfully — providers may close the connection right after the final
///   delta.
///
/// Returns `Err` only for terminal failures (read error, cancellation); the
/// caller reports those through `on_error` exactly once. On `Ok(())` the
/// terminal `on_finish` has already been delivered.
pub(crate) async fn process_stream<F: SseFormat>(
    response: Response,
    cancel: &CancellationToken,
    callbacks: &mut StreamCallbacks,
) -> Result<()> {
    let mut stream = response.bytes_stream();
    // Byte buffer, not String: a read boundary may fall inside a multi-byte
    // UTF-8 character, so decoding happens per complete line only.
    let mut buffer: Vec<u8> = Vec::new();
    let mut final_message = String::new();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            next = stream.next() => next,
        };
        let Some(chunk_result) = next else {
            break;
        };
        let chunk = chunk_result.map_err(StreamError::ResponseRead)?;
        buffer.extend_from_slice(&chunk);

        // Process by line; the tail stays buffered until its newline arrives
        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim();

            // SSE field separators / keep-alives
            if line.is_empty() {
                continue;
            }

            let Some(payload) = parse_sse_line(line) else {
                continue;
            };

            if F::DONE_SENTINEL == Some(payload) {
                callbacks.emit_finish(final_message);
                return Ok(());
            }

            match F::parse_event(payload) {
                Ok(SseEvent::Delta(text)) => {
                    final_message.push_str(&text);
                    callbacks.emit_content(&text);
                }
                Ok(SseEvent::Stop) => {
                    callbacks.emit_finish(final_message);
                    return Ok(());
                }
                Ok(SseEvent::Ignore) => {}
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse {} SSE data: {}, line: {}",
                        F::PROVIDER,
                        e,
                        payload
                    );
                    let err = StreamError::EventParse {
                        payload: payload.to_string(),
                        source: e,
                    };
                    callbacks.emit_error(&err);
                }
            }
        }
    }

    // Stream closed without an explicit terminator: treat as completion.
    callbacks.emit_finish(final_message);
    Ok(())
}
