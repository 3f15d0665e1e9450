use crate::error::StreamError;

type ContentFn = Box<dyn FnMut(&str) + Send>;
type FinishFn = Box<dyn FnOnce(String) + Send>;
type ErrorFn = Box<dyn FnMut(&StreamError) + Send>;

/// Callback set for one streaming invocation.
///
/// All three slots are optional. Per invocation, `on_content` fires zero or
/// more times with incremental fragments (never empty, never cumulative),
/// strictly before the single terminal callback: either `on_finish` with the
/// full accumulated text, or `on_error` with a terminal error. `on_error`
/// may additionally fire for recoverable per-event parse failures before the
/// terminal callback (see [`StreamError::is_recoverable`]).
///
/// Callbacks run synchronously on the invocation's own task; long-running
/// callback bodies delay stream consumption, and their thread safety is the
/// caller's responsibility.
///
/// # Example
/// ```
/// use llm_streamer::StreamCallbacks;
///
/// let callbacks = StreamCallbacks::new()
///     .on_content(|fragment| print!("{}", fragment))
///     .on_finish(|full| println!("\n--- {} chars total", full.len()))
///     .on_error(|err| eprintln!("stream error: {}", err));
/// ```
#[derive(Default)]
pub struct StreamCallbacks {
    content: Option<ContentFn>,
    finish: Option<FinishFn>,
    error: Option<ErrorFn>,
}

impl StreamCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler for incremental content fragments.
    pub fn on_content(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.content = Some(Box::new(f));
        self
    }

    /// Sets the handler receiving the full accumulated text on completion.
    pub fn on_finish(mut self, f: impl FnOnce(String) + Send + 'static) -> Self {
        self.finish = Some(Box::new(f));
        self
    }

    /// Sets the handler for recoverable and terminal errors.
    pub fn on_error(mut self, f: impl FnMut(&StreamError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub(crate) fn emit_content(&mut self, fragment: &str) {
        if let Some(f) = self.content.as_mut() {
            f(fragment);
        }
    }

    pub(crate) fn emit_finish(&mut self, final_message: String) {
        // FnOnce slot: a second finish is structurally impossible.
        if let Some(f) = self.finish.take() {
            f(final_message);
        }
    }

    pub(crate) fn emit_error(&mut self, error: &StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }
}
