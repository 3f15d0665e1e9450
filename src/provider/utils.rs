//! Provider endpoint and default constants.

/// OpenAI API endpoint suffix
pub const OPENAI_API_SUFFIX: &str = "/v1/chat/completions";

/// Anthropic API endpoint suffix
pub const ANTHROPIC_API_SUFFIX: &str = "/v1/messages";

/// OpenAI default base URL
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";

/// Anthropic default base URL
pub const DEFAULT_ANTHROPIC_BASE: &str = "https://api.anthropic.com";

/// Model used when the caller leaves the model selection unset.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Model used when the caller leaves the model selection unset.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";

/// Default completion budget sent with every request.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Completes an endpoint base URL with the expected API path.
///
/// Trailing slashes are removed; if the URL already ends with the expected
/// suffix it is returned as-is.
///
/// # Example
/// ```
/// use llm_streamer::provider::utils::complete_endpoint;
///
/// assert_eq!(
///     complete_endpoint("https://api.openai.com", "/v1/chat/completions"),
///     "https://api.openai.com/v1/chat/completions"
/// );
///
/// assert_eq!(
///     complete_endpoint("https://api.openai.com/v1/chat/completions/", "/v1/chat/completions"),
///     "https://api.openai.com/v1/chat/completions"
/// );
/// ```
pub fn complete_endpoint(base_url: &str, expected_suffix: &str) -> String {
    let url = base_url.trim_end_matches('/');
    let suffix = expected_suffix.trim_start_matches('/');

    if url.ends_with(suffix) {
        return url.to_string();
    }

    format!("{}/{}", url, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_complete_endpoint_bare_base() {
        assert_eq!(
            complete_endpoint("https://api.anthropic.com", ANTHROPIC_API_SUFFIX),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn test_complete_endpoint_trailing_slash() {
        assert_eq!(
            complete_endpoint("http://127.0.0.1:1234/", OPENAI_API_SUFFIX),
            "http://127.0.0.1:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_complete_endpoint_already_complete() {
        assert_eq!(
            complete_endpoint("https://api.openai.com/v1/chat/completions", OPENAI_API_SUFFIX),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
