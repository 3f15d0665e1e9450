use serde::Deserialize;

use super::{SseEvent, SseFormat};

/// Chunk structure of an OpenAI streaming response
#[derive(Debug, Deserialize)]
struct OpenAiChunk {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    delta: OpenAiDelta,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI wire format (chunk-oriented shape).
///
/// SSE format:
/// ```text
/// data: {"id":"...","choices":[{"delta":{"content":"Hello"}}]}
///
/// data: {"id":"...","choices":[{"delta":{"content":" world"}}]}
///
/// data: [DONE]
/// ```
///
/// Termination is the `[DONE]` sentinel (or clean connection close);
/// `finish_reason` on individual chunks is not treated as a terminator.
pub struct OpenAiFormat;

impl SseFormat for OpenAiFormat {
    const PROVIDER: &'static str = "OpenAI";
    const DONE_SENTINEL: Option<&'static str> = Some("[DONE]");

    fn parse_event(payload: &str) -> serde_json::Result<SseEvent> {
        let chunk: OpenAiChunk = serde_json::from_str(payload)?;
        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(SseEvent::Ignore);
        };
        match choice.delta.content {
            Some(text) if !text.is_empty() => Ok(SseEvent::Delta(text)),
            _ => Ok(SseEvent::Ignore),
        }
    }
}
