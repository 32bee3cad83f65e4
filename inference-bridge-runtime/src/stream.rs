//! Delivery of streamed fragments to a caller's handler.

use std::time::Instant;

use futures::{Stream, StreamExt};
use inference_bridge_core::chat::StreamContentKind;
use inference_bridge_core::{Result, StreamConfig, StreamEvent};
use tracing::trace;

use crate::context::CallContext;

/// Feeds `events` to `handler` one at a time, in arrival order
///
/// Stops at the end of the stream, at the first error from the stream or the
/// handler, or when `ctx` is cancelled, and returns that error. On success
/// returns how many events were delivered.
///
/// # Examples
///
/// ```
/// use futures::stream;
/// use inference_bridge_core::StreamEvent;
/// use inference_bridge_runtime::{CallContext, deliver_stream};
///
/// # tokio_test::block_on(async {
/// let events = stream::iter(vec![Ok(StreamEvent::text("Hel")), Ok(StreamEvent::text("lo"))]);
/// let mut seen = String::new();
/// let n = deliver_stream(&CallContext::new(), events, |event: StreamEvent| {
///     seen.push_str(event.chunk_text());
///     Ok(())
/// })
/// .await
/// .unwrap();
/// assert_eq!((n, seen.as_str()), (2, "Hello"));
/// # });
/// ```
pub async fn deliver_stream<S, H>(ctx: &CallContext, events: S, mut handler: H) -> Result<usize>
where
    S: Stream<Item = Result<StreamEvent>>,
    H: FnMut(StreamEvent) -> Result<()>,
{
    futures::pin_mut!(events);
    let mut delivered = 0;
    loop {
        let next = ctx.run(async { Ok(events.next().await) }).await?;
        let Some(event) = next else {
            trace!(delivered, "stream drained");
            return Ok(delivered);
        };
        handler(event?)?;
        delivered += 1;
    }
}

/// Coalesces small fragments into larger events
///
/// Buffered text is handed to the handler when it reaches the configured
/// chunk size, when the flush interval has elapsed, when the content kind
/// switches between text and thinking, and on [`StreamEmitter::finish`].
pub struct StreamEmitter<H> {
    handler: H,
    config: StreamConfig,
    provider: Option<String>,
    model: Option<String>,
    kind: Option<StreamContentKind>,
    buffer: String,
    last_flush: Instant,
    emitted: usize,
}

impl<H> StreamEmitter<H>
where
    H: FnMut(StreamEvent) -> Result<()>,
{
    pub fn new(config: StreamConfig, handler: H) -> Self {
        Self {
            handler,
            config,
            provider: None,
            model: None,
            kind: None,
            buffer: String::new(),
            last_flush: Instant::now(),
            emitted: 0,
        }
    }

    /// Tags every emitted event with the provider and model
    #[must_use]
    pub fn with_origin(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self.model = Some(model.into());
        self
    }

    pub fn push_text(&mut self, fragment: &str) -> Result<()> {
        self.push(StreamContentKind::Text, fragment)
    }

    pub fn push_thinking(&mut self, fragment: &str) -> Result<()> {
        self.push(StreamContentKind::Thinking, fragment)
    }

    pub fn push_event(&mut self, event: StreamEvent) -> Result<()> {
        self.push(event.kind(), event.chunk_text())
    }

    fn push(&mut self, kind: StreamContentKind, fragment: &str) -> Result<()> {
        if fragment.is_empty() {
            return Ok(());
        }
        if self.kind.is_some_and(|current| current != kind) {
            self.flush()?;
        }
        self.kind = Some(kind);
        self.buffer.push_str(fragment);

        if self.buffer.chars().count() >= self.config.chunk_size()
            || self.last_flush.elapsed() >= self.config.flush_interval()
        {
            self.flush()?;
        }
        Ok(())
    }

    /// Emits whatever is buffered
    pub fn flush(&mut self) -> Result<()> {
        self.last_flush = Instant::now();
        let Some(kind) = self.kind else {
            return Ok(());
        };
        if self.buffer.is_empty() {
            return Ok(());
        }

        let text = std::mem::take(&mut self.buffer);
        let mut event = match kind {
            StreamContentKind::Text => StreamEvent::text(text),
            StreamContentKind::Thinking => StreamEvent::thinking(text),
        };
        event.provider = self.provider.clone();
        event.model = self.model.clone();
        self.emitted += 1;
        (self.handler)(event)
    }

    /// Flushes the tail and returns how many events were emitted
    pub fn finish(mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.emitted)
    }
}
