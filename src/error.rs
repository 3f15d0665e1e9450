use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StreamError>;

/// Maximum length of an error-body preview embedded in [`StreamError::Api`].
const ERROR_PREVIEW_LENGTH: usize = 500;

/// Errors surfaced through the `on_error` callback.
///
/// All variants except [`EventParse`] are terminal: they are reported exactly
/// once and no `on_finish` follows. [`EventParse`] is recoverable — the
/// decoder reports it and keeps reading the stream.
///
/// [`EventParse`]: StreamError::EventParse
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("API key is missing or empty")]
    MissingApiKey,

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to build request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{provider} API error ({status}): failed to read error body: {source}")]
    ApiBodyRead {
        provider: &'static str,
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response stream: {0}")]
    ResponseRead(#[source] reqwest::Error),

    #[error("Failed to parse stream event: {source}; payload: {payload}")]
    EventParse {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StreamError {
    /// Whether the stream continues after this error is reported.
    ///
    /// Only per-event parse failures are recoverable; every transport or
    /// protocol failure terminates the invocation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StreamError::EventParse { .. })
    }
}

/// Truncates an error body for inclusion in an error message.
///
/// Cuts at a char boundary so multi-byte responses cannot panic.
pub(crate) fn truncate_for_preview(s: &str) -> String {
    if s.len() <= ERROR_PREVIEW_LENGTH {
        return s.to_string();
    }
    let mut end = ERROR_PREVIEW_LENGTH;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
