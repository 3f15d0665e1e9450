use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::streaming::openai::OpenAiFormat;
use super::utils::{
    DEFAULT_MAX_TOKENS, DEFAULT_OPENAI_BASE, DEFAULT_OPENAI_MODEL, OPENAI_API_SUFFIX,
    complete_endpoint,
};
use super::{ChatStreamer, dispatch_stream, shared_http_client};
use crate::callbacks::StreamCallbacks;
use crate::error::StreamError;
use crate::message::Message;

/// OpenAI chat-completions streaming client.
pub struct OpenAiStreamer {
    api_key: String,
    endpoint: String,
    model: Option<String>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    stream: bool,
}

impl OpenAiStreamer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: format!("{}{}", DEFAULT_OPENAI_BASE, OPENAI_API_SUFFIX),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Overrides the model id; an empty string keeps the default
    /// (`gpt-4o`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = (!model.is_empty()).then_some(model);
        self
    }

    /// Points the client at an OpenAI-compatible endpoint base URL.
    pub fn with_endpoint(mut self, base_url: &str) -> Self {
        self.endpoint = complete_endpoint(base_url, OPENAI_API_SUFFIX);
        self
    }

    /// Overrides the completion budget (default 1024).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ChatStreamer for OpenAiStreamer {
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

        let model = self.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
        let request = OpenAiRequest {
            model,
            messages,
            max_tokens: self.max_tokens,
            stream: true,
        };
        let authorization = format!("Bearer {}", self.api_key);
        let headers = [("Authorization", authorization.as_str())];

        if let Err(e) = dispatch_stream::<OpenAiFormat, _>(
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
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_endpoint_completion() {
        let streamer = OpenAiStreamer::new("sk-test");
        assert_eq!(streamer.endpoint, "https://api.openai.com/v1/chat/completions");

        let streamer = OpenAiStreamer::new("sk-test").with_endpoint("http://127.0.0.1:8080");
        assert_eq!(streamer.endpoint, "http://127.0.0.1:8080/v1/chat/completions");
    }

    #[test]
    fn test_empty_model_keeps_default() {
        let streamer = OpenAiStreamer::new("sk-test").with_model("");
        assert_eq!(streamer.model, None);

        let streamer = OpenAiStreamer::new("sk-test").with_model("gpt-4o-mini");
        assert_eq!(streamer.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_request_body_wire_format() {
        let messages = [Message::user("hi"), Message::assistant("hello")];
        let request = OpenAiRequest {
            model: DEFAULT_OPENAI_MODEL,
            messages: &messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: true,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                ],
                "max_tokens": 1024,
                "stream": true,
            })
        );
    }
}
