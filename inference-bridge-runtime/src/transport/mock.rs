use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use inference_bridge_core::{Error, Result};

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::context::CallContext;

#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    Failure(String),
}

/// Mock transport for testing
///
/// Replies are handed out in the order they were queued. Once the queue is
/// empty every request gets a canned `200` JSON body.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Creates a new mock transport
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_runtime::transport::mock::MockTransport;
    ///
    /// let transport = MockTransport::new();
    /// assert!(transport.last_request().is_none());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_runtime::transport::mock::MockTransport;
    /// use serde_json::json;
    ///
    /// let transport = MockTransport::new();
    /// transport.push_json(200, json!({"id": "msg_1"}));
    /// ```
    pub fn push_response(&self, response: HttpResponse) -> &Self {
        lock(&self.replies).push_back(MockReply::Response(response));
        self
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) -> &Self {
        let mut response = HttpResponse::new(status, body.to_string());
        response
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        self.push_response(response)
    }

    /// Queues a transport-level failure, as if the connection dropped
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(MockReply::Failure(message.into()));
        self
    }

    /// Makes every request wait `delay` before replying
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, ctx: &CallContext, request: HttpRequest) -> Result<HttpResponse> {
        lock(&self.requests).push(request);
        let reply = lock(&self.replies).pop_front();

        let exchange = async {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match reply {
                Some(MockReply::Response(response)) => Ok(response),
                Some(MockReply::Failure(message)) => Err(Error::Other(message)),
                None => Ok(HttpResponse::new(
                    200,
                    serde_json::json!({
                        "id": "mock-response",
                        "content": [{"type": "text", "text": "This is a mock response"}]
                    })
                    .to_string(),
                )),
            }
        };

        ctx.run(exchange).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request() -> HttpRequest {
        HttpRequest::new("POST", Url::parse("https://api.example.com/v1").unwrap())
    }

    #[tokio::test]
    async fn test_replies_in_order_then_default() {
        let transport = MockTransport::new();
        transport
            .push_json(500, serde_json::json!({"error": "x"}))
            .push_failure("connection reset");

        let ctx = CallContext::new();
        assert_eq!(transport.send(&ctx, request()).await.unwrap().status, 500);
        assert!(transport.send(&ctx, request()).await.is_err());
        let fallback = transport.send(&ctx, request()).await.unwrap();
        assert_eq!(fallback.status, 200);
        assert!(fallback.body.contains("mock-response"));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_honours_deadline() {
        let transport = MockTransport::new().with_delay(Duration::from_secs(10));
        let ctx = CallContext::new().with_timeout(Duration::from_secs(1));
        let err = transport.send(&ctx, request()).await.unwrap_err();
        assert!(err.is_cancellation());
        assert!(transport.last_request().is_some());
    }
}
