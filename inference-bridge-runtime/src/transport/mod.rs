use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use inference_bridge_core::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::context::CallContext;

/// One outgoing HTTP request to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// A `POST` carrying `payload` as JSON
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_runtime::transport::HttpRequest;
    /// use serde_json::json;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://api.example.com/v1/messages").unwrap();
    /// let request = HttpRequest::json(url, &json!({"model": "m"})).unwrap();
    /// assert_eq!(request.method, "POST");
    /// assert_eq!(request.headers["content-type"], "application/json");
    /// ```
    pub fn json<T: Serialize + ?Sized>(url: Url, payload: &T) -> Result<Self> {
        let mut request = Self::new("POST", url);
        request.body = Some(serde_json::to_string(payload)?);
        request
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        Ok(request)
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A provider's reply, whatever its status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a failure status into the matching error
    ///
    /// 401 becomes [`Error::Authentication`], 429 [`Error::RateLimit`], and
    /// any other non-2xx status [`Error::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(match self.status {
            401 => Error::Authentication(format!("API authentication failed: {}", self.body)),
            429 => Error::RateLimit(format!("API rate limit exceeded: {}", self.body)),
            status => Error::Status {
                status,
                message: self.body,
            },
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends provider requests
///
/// `send` returns any response the server produced, including failures, so
/// wrapping transports can observe it. Call [`HttpTransport::send_checked`]
/// to get failure statuses as errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, ctx: &CallContext, request: HttpRequest) -> Result<HttpResponse>;

    async fn send_checked(&self, ctx: &CallContext, request: HttpRequest) -> Result<HttpResponse> {
        self.send(ctx, request).await?.error_for_status()
    }
}

/// HTTP Transport implementation
pub mod http;

/// Mock Transport implementation for testing
pub mod mock;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(200, "{}").error_for_status().is_ok());
        assert!(matches!(
            HttpResponse::new(401, "bad key").error_for_status(),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            HttpResponse::new(429, "slow down").error_for_status(),
            Err(Error::RateLimit(_))
        ));
        match HttpResponse::new(500, "overloaded").error_for_status() {
            Err(Error::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "overloaded");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_json_request() {
        let url = Url::parse("https://api.example.com/v1").unwrap();
        let request = HttpRequest::json(url, &serde_json::json!({"a": 1}))
            .unwrap()
            .with_header("x-api-key", "k");
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(request.headers.len(), 2);
    }
}
