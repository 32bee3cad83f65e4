use std::collections::BTreeMap;

use async_trait::async_trait;
use inference_bridge_core::provider::DEFAULT_API_TIMEOUT;
use inference_bridge_core::{Error, Result};
use reqwest::{Client, Method, header};
use tracing::{instrument, trace};

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::context::CallContext;

/// HTTP transport over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Creates a new HTTP transport with default configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_runtime::transport::http::ReqwestTransport;
    ///
    /// let transport = ReqwestTransport::new();
    /// ```
    pub fn new() -> Self {
        let client = Client::builder().build().unwrap_or_default();
        Self { client }
    }

    /// Creates a new HTTP transport with a custom client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(&self, ctx: &CallContext, request: HttpRequest) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidArgument(format!("bad HTTP method: {}", e)))?;

        let mut header_map = header::HeaderMap::new();
        for (key, value) in &request.headers {
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::from_bytes(key.as_bytes()),
                header::HeaderValue::from_str(value),
            ) {
                header_map.insert(name, value);
            }
        }

        let timeout = request.timeout.unwrap_or(DEFAULT_API_TIMEOUT);
        let mut builder = self
            .client
            .request(method, request.url)
            .headers(header_map)
            .timeout(timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout.as_secs()))?;
            let status = response.status().as_u16();
            let headers: BTreeMap<String, String> = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| map_reqwest_error(e, timeout.as_secs()))?;
            trace!(status, bytes = body.len(), "received provider response");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        };

        ctx.run(exchange).await
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout_secs: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout_secs)
    } else {
        Error::Request(err)
    }
}
