//! Per-call diagnostic capture.
//!
//! A [`CompletionDebugger`] wraps the HTTP transport once and opens a span
//! for every completion call. The instrumenting transport records each
//! exchange into the call's debug state; ending the span merges that state
//! with the provider's raw response and the call error into one scrubbed
//! payload. Ending a span never fails: anything that goes wrong while
//! building the payload is logged and the call gets no debug details.

pub mod scrub;
pub mod state;
pub mod transport;

use std::sync::Arc;

use inference_bridge_core::{CompletionRequest, Error, StreamConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tower::Layer;
use tracing::{debug, error};
use uuid::Uuid;

use crate::context::CallContext;
use crate::transport::HttpTransport;
use scrub::scrub_value;
use state::DebugStateHandle;
use transport::DebugLayer;

/// Appended to the error message when the provider gave back nothing usable
pub const NIL_RESPONSE_MESSAGE: &str = "got nil response from LLM api";

/// What to capture; the default captures everything, scrubbed, without logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugConfig {
    pub disable: bool,
    pub disable_request_body: bool,
    pub disable_response_body: bool,
    pub disable_content_stripping: bool,
    /// Emit a `debug` event per request and response
    #[serde(rename = "logToSlog")]
    pub log_to_tracing: bool,
}

impl DebugConfig {
    pub fn strip_content(&self) -> bool {
        !self.disable_content_stripping
    }
}

/// Failures while assembling a debug payload
///
/// These stop at the span boundary and are only ever logged.
#[derive(Error, Debug)]
pub enum DebugError {
    #[error("failed to serialize debug payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("value nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("invalid scrub pattern: {0}")]
    Pattern(String),
}

/// Read-only description of the call a span belongs to
#[derive(Debug, Clone, Default)]
pub struct SpanStart {
    pub provider: String,
    pub model: String,
    pub request: Option<CompletionRequest>,
    pub stream_config: Option<StreamConfig>,
}

impl SpanStart {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_request(mut self, request: CompletionRequest) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn with_stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = Some(config);
        self
    }
}

/// How the call finished
#[derive(Default)]
pub struct SpanEnd<'a> {
    /// The vendor SDK's response object, before normalization
    pub provider_response: Option<&'a dyn erased_serde::Serialize>,
    pub error: Option<&'a Error>,
    /// The provider produced no usable response
    pub nil_response: bool,
}

impl<'a> SpanEnd<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_provider_response(mut self, raw: &'a dyn erased_serde::Serialize) -> Self {
        self.provider_response = Some(raw);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: &'a Error) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn with_nil_response(mut self, nil_response: bool) -> Self {
        self.nil_response = nil_response;
        self
    }
}

/// Creates spans and instruments transports
pub trait CompletionDebugger: Send + Sync {
    /// Returns the transport to use for provider calls
    fn wrap_transport(&self, base: Arc<dyn HttpTransport>) -> Arc<dyn HttpTransport>;

    /// Opens a span; the returned context must be used for the call
    fn start_span(
        &self,
        ctx: &CallContext,
        start: SpanStart,
    ) -> (CallContext, Option<Box<dyn CompletionSpan>>);
}

/// One call's diagnostic lifecycle; consumed when it ends
pub trait CompletionSpan: Send {
    /// Builds the debug payload, or `None` when there is nothing to attach
    fn end(self: Box<Self>, end: SpanEnd<'_>) -> Option<Value>;
}

/// Picks the debugger for a configuration
pub fn debugger_for(config: DebugConfig) -> Arc<dyn CompletionDebugger> {
    if config.disable {
        Arc::new(NoopDebugger)
    } else {
        Arc::new(HttpCompletionDebugger::new(config))
    }
}

/// Captures nothing and leaves transports alone
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDebugger;

impl CompletionDebugger for NoopDebugger {
    fn wrap_transport(&self, base: Arc<dyn HttpTransport>) -> Arc<dyn HttpTransport> {
        base
    }

    fn start_span(
        &self,
        ctx: &CallContext,
        _start: SpanStart,
    ) -> (CallContext, Option<Box<dyn CompletionSpan>>) {
        (ctx.clone(), None)
    }
}

/// Records HTTP exchanges and builds scrubbed payloads from them
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpCompletionDebugger {
    config: DebugConfig,
}

impl HttpCompletionDebugger {
    pub fn new(config: DebugConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }
}

impl CompletionDebugger for HttpCompletionDebugger {
    fn wrap_transport(&self, base: Arc<dyn HttpTransport>) -> Arc<dyn HttpTransport> {
        DebugLayer::new(self.config).layer(base)
    }

    fn start_span(
        &self,
        ctx: &CallContext,
        start: SpanStart,
    ) -> (CallContext, Option<Box<dyn CompletionSpan>>) {
        if self.config.disable {
            return (ctx.clone(), None);
        }
        let state = DebugStateHandle::new();
        let span = HttpSpan {
            id: Uuid::new_v4(),
            config: self.config,
            info: start,
            state: state.clone(),
        };
        debug!(
            span_id = %span.id,
            provider = %span.info.provider,
            model = %span.info.model,
            "debug span started"
        );
        (ctx.clone().with_debug_state(state), Some(Box::new(span)))
    }
}

struct HttpSpan {
    id: Uuid,
    config: DebugConfig,
    info: SpanStart,
    state: DebugStateHandle,
}

impl HttpSpan {
    fn build_payload(&self, end: &SpanEnd<'_>) -> Result<Option<Value>, DebugError> {
        // Work on a copy; other holders of the recorded error see no change.
        let mut state = self.state.snapshot();

        if let Some(raw) = end.provider_response {
            let value = serde_json::to_value(raw)?;
            state.provider_response = Some(scrub_value(value, self.config.strip_content())?);
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(details) = &state.error_details {
            let message = details.message.trim();
            if !message.is_empty() {
                parts.push(message.to_string());
            }
        }
        if let Some(err) = end.error {
            let message = err.to_string();
            // A status error is already recorded by the transport with the same text.
            if !parts.contains(&message) {
                parts.push(message);
            }
        }
        if end.nil_response {
            parts.push(NIL_RESPONSE_MESSAGE.to_string());
        }

        if !parts.is_empty() {
            let mut details = state.error_details.take().unwrap_or_default();
            details.message = parts.join("; ");
            if details.request_details.is_none() {
                details.request_details = state.request_details.clone();
            }
            if details.response_details.is_none() {
                details.response_details = state.response_details.clone();
            }
            state.error_details = Some(details);
        }

        if state.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_value(&state)?))
    }
}

impl CompletionSpan for HttpSpan {
    fn end(self: Box<Self>, end: SpanEnd<'_>) -> Option<Value> {
        match self.build_payload(&end) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    span_id = %self.id,
                    provider = %self.info.provider,
                    model = %self.info.model,
                    error = %err,
                    "dropping debug details after capture failure"
                );
                None
            }
        }
    }
}
