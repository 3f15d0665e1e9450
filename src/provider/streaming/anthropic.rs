use serde::Deserialize;

use super::{SseEvent, SseFormat};

/// Anthropic SSE event type
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: AnthropicTextDelta },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(other)]
    Other,
}

/// Anthropic text increment
#[derive(Debug, Deserialize)]
struct AnthropicTextDelta {
    #[serde(rename = "type")]
    delta_type: String,
    #[serde(default)]
    text: String,
}

/// Anthropic wire format (typed-event shape).
///
/// SSE format:
/// ```text
/// event: message_start
/// data: {"type":"message_start","message":{"id":"..."}}
///
/// event: content_block_delta
/// data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}
///
/// event: message_stop
/// data: {"type":"message_stop"}
/// ```
///
/// Only `content_block_delta` and `message_stop` carry meaning here; every
/// other event type is ignored for forward compatibility. There is no
/// `[DONE]`-style sentinel.
pub struct AnthropicFormat;

impl SseFormat for AnthropicFormat {
    const PROVIDER: &'static str = "Anthropic";
    const DONE_SENTINEL: Option<&'static str> = None;

    fn parse_event(payload: &str) -> serde_json::Result<SseEvent> {
        match serde_json::from_str::<AnthropicEvent>(payload)? {
            AnthropicEvent::ContentBlockDelta { delta }
                if delta.delta_type == "text_delta" && !delta.text.is_empty() =>
            {
                Ok(SseEvent::Delta(delta.text))
            }
            AnthropicEvent::ContentBlockDelta { .. } => Ok(SseEvent::Ignore),
            AnthropicEvent::MessageStop => Ok(SseEvent::Stop),
            AnthropicEvent::Other => Ok(SseEvent::Ignore),
        }
    }
}
