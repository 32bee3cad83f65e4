use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use inference_bridge_core::Result;
use serde_json::Value;
use tower::Layer;
use tracing::{debug, error};

use super::DebugConfig;
use super::scrub::{redact_headers, redact_params, scrub_value};
use super::state::{ApiErrorDetails, ApiRequestDetails, ApiResponseDetails};
use crate::context::CallContext;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Wraps a transport so every exchange is recorded into the call's debug state
///
/// With capture disabled the base transport is handed back untouched.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use inference_bridge_runtime::debug::DebugConfig;
/// use inference_bridge_runtime::debug::transport::DebugLayer;
/// use inference_bridge_runtime::transport::HttpTransport;
/// use inference_bridge_runtime::transport::mock::MockTransport;
/// use tower::ServiceBuilder;
///
/// let base: Arc<dyn HttpTransport> = Arc::new(MockTransport::new());
/// let transport = ServiceBuilder::new()
///     .layer(DebugLayer::new(DebugConfig::default()))
///     .service(base);
/// # let _ = transport;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugLayer {
    config: DebugConfig,
}

impl DebugLayer {
    pub fn new(config: DebugConfig) -> Self {
        Self { config }
    }
}

impl Layer<Arc<dyn HttpTransport>> for DebugLayer {
    type Service = Arc<dyn HttpTransport>;

    fn layer(&self, inner: Arc<dyn HttpTransport>) -> Self::Service {
        if self.config.disable {
            return inner;
        }
        Arc::new(InstrumentedTransport {
            inner,
            config: self.config,
        })
    }
}

/// Records request, response and error details as each exchange completes
pub struct InstrumentedTransport {
    inner: Arc<dyn HttpTransport>,
    config: DebugConfig,
}

#[async_trait]
impl HttpTransport for InstrumentedTransport {
    async fn send(&self, ctx: &CallContext, request: HttpRequest) -> Result<HttpResponse> {
        let request_details = capture_request(&request, &self.config);
        if self.config.log_to_tracing {
            debug!(
                method = %request.method,
                url = ?request_details.url,
                headers = ?request_details.headers,
                "provider request"
            );
        }
        let state = ctx.debug_state();
        if let Some(state) = state {
            state.record_request(request_details.clone());
        }

        let result = self.inner.send(ctx, request).await;

        match &result {
            Ok(response) => {
                let response_details = capture_response(response, &self.config);
                if self.config.log_to_tracing {
                    debug!(
                        status = response.status,
                        url = ?request_details.url,
                        headers = ?response_details.headers,
                        "provider response"
                    );
                }
                if let Some(state) = state {
                    state.record_response(response_details.clone());
                    if let Err(err) = response.clone().error_for_status() {
                        state.record_error(ApiErrorDetails {
                            message: err.to_string(),
                            request_details: Some(request_details),
                            response_details: Some(response_details),
                        });
                    }
                }
            }
            Err(err) => {
                if self.config.log_to_tracing {
                    debug!(url = ?request_details.url, error = %err, "provider request failed");
                }
                if let Some(state) = state {
                    state.record_error(ApiErrorDetails {
                        message: err.to_string(),
                        request_details: Some(request_details),
                        response_details: None,
                    });
                }
            }
        }

        result
    }
}

fn capture_request(request: &HttpRequest, config: &DebugConfig) -> ApiRequestDetails {
    let params = redact_params(request.url.query_pairs());
    let mut bare = request.url.clone();
    bare.set_query(None);
    bare.set_fragment(None);

    let headers = redact_headers(&request.headers);
    let data = if config.disable_request_body {
        None
    } else {
        request
            .body
            .as_deref()
            .and_then(|body| capture_body(body, config.strip_content()))
    };

    let mut curl_url = bare.clone();
    if !params.is_empty() {
        curl_url.query_pairs_mut().extend_pairs(params.iter());
    }
    let curl_body = data.as_ref().map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    let curl = curl_command(
        &request.method,
        curl_url.as_str(),
        &headers,
        curl_body.as_deref(),
    );

    ApiRequestDetails {
        url: Some(bare.to_string()),
        method: Some(request.method.clone()),
        headers,
        params,
        data,
        timeout: request.timeout.map(|t| t.as_secs()),
        curl_command: Some(curl),
    }
}

fn capture_response(response: &HttpResponse, config: &DebugConfig) -> ApiResponseDetails {
    let data = if config.disable_response_body {
        None
    } else {
        capture_body(&response.body, config.strip_content())
    };
    ApiResponseDetails {
        data,
        status: Some(response.status),
        headers: redact_headers(&response.headers),
    }
}

// Non-JSON bodies (event streams, HTML error pages) are opaque to the
// scrubber, so they are either kept whole or replaced by their length.
fn capture_body(body: &str, strip: bool) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match scrub_value(value, strip) {
            Ok(scrubbed) => Some(scrubbed),
            Err(err) => {
                error!(error = %err, "failed to scrub captured body");
                None
            }
        },
        Err(_) if strip => Some(Value::String(format!(
            "<redacted: {} chars>",
            body.chars().count()
        ))),
        Err(_) => Some(Value::String(body.to_string())),
    }
}

/// Rebuilds a request as a POSIX shell `curl` invocation
///
/// Callers pass headers that were already redacted.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use inference_bridge_runtime::debug::transport::curl_command;
///
/// let mut headers = BTreeMap::new();
/// headers.insert("content-type".to_string(), "application/json".to_string());
/// let cmd = curl_command("POST", "https://api.example.com/v1/messages", &headers, Some("{}"));
/// assert!(cmd.starts_with("curl -X POST "));
/// assert!(cmd.contains(" -H 'content-type: application/json'"));
/// assert!(cmd.ends_with(" --data-raw '{}'"));
/// ```
pub fn curl_command(
    method: &str,
    url: &str,
    headers: &BTreeMap<String, String>,
    body: Option<&str>,
) -> String {
    let mut parts = vec![
        "curl".to_string(),
        "-X".to_string(),
        shell_quote(method),
        shell_quote(url),
    ];
    for (key, value) in headers {
        parts.push("-H".to_string());
        parts.push(shell_quote(&format!("{}: {}", key, value)));
    }
    if let Some(body) = body {
        parts.push("--data-raw".to_string());
        parts.push(shell_quote(body));
    }
    parts.join(" ")
}

fn shell_quote(s: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(s)).into_owned()
}
