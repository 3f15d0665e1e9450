//! # llm-streamer
//!
//! Streaming chat-completion clients for OpenAI and Anthropic behind one
//! callback interface.
//!
//! One [`stream_chat`](ChatStreamer::stream_chat) call sends a conversation,
//! opens the provider's SSE stream, and decodes it incrementally: each text
//! fragment is delivered through `on_content` the moment it arrives, the full
//! accumulated message through `on_finish`, and every failure through
//! `on_error`. Nothing is buffered until completion and no error panics or
//! escapes the callback contract.
//!
//! ## Quick start
//! ```no_run
//! use llm_streamer::{AnthropicStreamer, ChatStreamer, Message, StreamCallbacks};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let streamer = AnthropicStreamer::new(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())
//!     .with_model("claude-3-5-sonnet-20241022");
//!
//! let callbacks = StreamCallbacks::new()
//!     .on_content(|fragment| print!("{}", fragment))
//!     .on_finish(|full| println!("\n[{} chars]", full.len()))
//!     .on_error(|err| eprintln!("error: {}", err));
//!
//! streamer
//!     .stream_chat(
//!         CancellationToken::new(),
//!         &[Message::user("Write a haiku about rivers.")],
//!         callbacks,
//!     )
//!     .await;
//! # }
//! ```
//!
//! ## Behavior notes
//! - Requests carry no timeout; cancel via the [`CancellationToken`] passed
//!   to each call.
//! - A malformed individual stream event is reported through `on_error` but
//!   does not abort the stream; a transport read failure does.
//! - A stream that closes cleanly without an explicit terminator still
//!   finishes successfully with the text accumulated so far.
//!
//! TLS note: the crate is built against rustls without a default crypto
//! provider; the embedding application installs one once at startup, e.g.
//! `rustls::crypto::ring::default_provider().install_default()`.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod callbacks;
pub mod error;
pub mod message;
pub mod provider;

pub use callbacks::StreamCallbacks;
pub use error::{Result, StreamError};
pub use message::{Message, Role};
pub use provider::ChatStreamer;
pub use provider::anthropic::AnthropicStreamer;
pub use provider::openai::OpenAiStreamer;
