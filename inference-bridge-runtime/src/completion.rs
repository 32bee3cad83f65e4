use std::future::Future;

use inference_bridge_core::{CompletionResponse, Error, Result};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::context::CallContext;
use crate::debug::{CompletionDebugger, SpanEnd, SpanStart};

/// The vendor SDK's response object, kept for diagnostics
pub type RawResponse = Box<dyn erased_serde::Serialize + Send + Sync>;

/// What a provider adapter hands back from one call
pub struct ProviderCall {
    pub result: Result<CompletionResponse>,
    pub raw_response: Option<RawResponse>,
}

impl ProviderCall {
    pub fn ok(response: CompletionResponse) -> Self {
        Self {
            result: Ok(response),
            raw_response: None,
        }
    }

    pub fn err(error: Error) -> Self {
        Self {
            result: Err(error),
            raw_response: None,
        }
    }

    /// Keeps the unnormalized vendor response for the debug payload
    #[must_use]
    pub fn with_raw_response<T>(mut self, raw: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        self.raw_response = Some(Box::new(raw));
        self
    }
}

impl From<Result<CompletionResponse>> for ProviderCall {
    fn from(result: Result<CompletionResponse>) -> Self {
        Self {
            result,
            raw_response: None,
        }
    }
}

/// A failed call together with whatever diagnostics were captured
#[derive(Error, Debug)]
#[error("{error}")]
pub struct FailedCompletion {
    #[source]
    pub error: Error,
    /// Carries `debug_details` when capture produced any
    pub response: CompletionResponse,
}

/// Runs one provider call inside a debug span
///
/// The span's context (with the debug state attached) is passed to `call`,
/// which should use it for every transport request. The call is cut short
/// when `ctx` is cancelled. The span is ended exactly once and its payload is
/// attached to the response on success and on failure alike.
///
/// # Examples
///
/// ```
/// use inference_bridge_core::CompletionResponse;
/// use inference_bridge_runtime::debug::{NoopDebugger, SpanStart};
/// use inference_bridge_runtime::{CallContext, ProviderCall, run_completion};
///
/// # tokio_test::block_on(async {
/// let response = run_completion(
///     &NoopDebugger,
///     &CallContext::new(),
///     SpanStart::new("openai", "gpt-4o"),
///     |_ctx| async { ProviderCall::ok(CompletionResponse::default()) },
/// )
/// .await
/// .unwrap();
/// assert!(response.debug_details.is_none());
/// # });
/// ```
#[instrument(skip_all, fields(provider = %start.provider, model = %start.model))]
pub async fn run_completion<F, Fut>(
    debugger: &dyn CompletionDebugger,
    ctx: &CallContext,
    start: SpanStart,
    call: F,
) -> std::result::Result<CompletionResponse, FailedCompletion>
where
    F: FnOnce(CallContext) -> Fut,
    Fut: Future<Output = ProviderCall>,
{
    let (call_ctx, span) = debugger.start_span(ctx, start);

    let fut = call(call_ctx.clone());
    let outcome = match call_ctx.run(async { Ok(fut.await) }).await {
        Ok(outcome) => outcome,
        Err(error) => ProviderCall::err(error),
    };

    let ProviderCall {
        result,
        raw_response,
    } = outcome;
    let (mut response, error) = match result {
        Ok(response) => (response, None),
        Err(error) => (CompletionResponse::default(), Some(error)),
    };
    let nil_response = error.is_some() && raw_response.is_none();

    if let Some(span) = span {
        let mut end = SpanEnd::new().with_nil_response(nil_response);
        if let Some(raw) = raw_response.as_deref() {
            end = end.with_provider_response(raw);
        }
        if let Some(error) = error.as_ref() {
            end = end.with_error(error);
        }
        response.debug_details = span.end(end);
    }

    match error {
        Some(error) => {
            warn!(error = %error, "completion failed");
            Err(FailedCompletion { error, response })
        }
        None => Ok(response),
    }
}
