use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::streaming::anthropic::AnthropicFormat;
use super::utils::{
    ANTHROPIC_API_SUFFIX, ANTHROPIC_VERSION, DEFAULT_ANTHROPIC_BASE, DEFAULT_ANTHROPIC_MODEL,
    DEFAULT_MAX_TOKENS, complete_endpoint,
};
use super::{ChatStreamer, dispatch_stream, shared_http_client};
use crate::callbacks::StreamCallbacks;
use crate::error::StreamError;
use crate::message::Message;

/// Anthropic messages-API streaming client.
pub struct AnthropicStreamer {
    api_key: String,
    endpoint: String,
    model: Option<String>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    stream: bool,
}

impl AnthropicStreamer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: format!("{}{}", DEFAULT_ANTHROPIC_BASE, ANTHROPIC_API_SUFFIX),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Overrides the model id; an empty string keeps the default
    /// (`claude-3-opus-20240229`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = (!model.is_empty()).then_some(model);
        self
    }

    /// Points the client at an Anthropic-compatible endpoint base URL.
    pub fn with_endpoint(mut self, base_url: &str) -> Self {
        self.endpoint = complete_endpoint(base_url, ANTHROPIC_API_SUFFIX);
        self
    }

    /// Overrides the completion budget (default 1024).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ChatStreamer for AnthropicStreamer {
    async fn stream_chat(
        &self,
        cancel: CancellationToken,
        messages: &[Message],
        callbacks: StreamCallbacks,
    ) {
        let mut callbacks = callbacks;

        if self.api_key.is_empty() {
            callbacks.emit_error(&StreamError::MissingApiKey);
            return;
        }

        let client = match shared_http_client() {
            Ok(client) => client,
            Err(e) => {
                callbacks.emit_error(&e);
                return;
            }
        };

        let model = self.model.as_deref().unwrap_or(DEFAULT_ANTHROPIC_MODEL);
        let request = AnthropicRequest {
            model,
            messages,
            max_tokens: self.max_tokens,
            stream: true,
        };
        let headers = [
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
        ];

        if let Err(e) = dispatch_stream::<AnthropicFormat, _>(
            &client,
            &self.endpoint,
            &headers,
            &request,
            &cancel,
            &mut callbacks,
        )
        .await
        {
            callbacks.emit_error(&e);
        }
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_endpoint_completion() {
        let streamer = AnthropicStreamer::new("sk-ant-test");
        assert_eq!(streamer.endpoint, "https://api.anthropic.com/v1/messages");

        let streamer = AnthropicStreamer::new("sk-ant-test").with_endpoint("http://127.0.0.1:8080/");
        assert_eq!(streamer.endpoint, "http://127.0.0.1:8080/v1/messages");
    }

    #[test]
    fn test_request_body_wire_format() {
        let messages = [Message::user("hi")];
        let request = AnthropicRequest {
            model: DEFAULT_ANTHROPIC_MODEL,
            messages: &messages,
            max_tokens: 256,
            stream: true,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "claude-3-opus-20240229",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 256,
                "stream": true,
            })
        );
    }
}
