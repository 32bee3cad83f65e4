use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;

/// What was sent to the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Per-request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curl_command: Option<String>,
}

/// What came back from the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// An error message together with the exchange that was active when it happened
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorDetails {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_details: Option<ApiRequestDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_details: Option<ApiResponseDetails>,
}

/// Everything captured for one completion call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpDebugState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_details: Option<ApiRequestDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_details: Option<ApiResponseDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ApiErrorDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_response: Option<Value>,
}

impl HttpDebugState {
    /// True when nothing worth attaching was captured
    pub fn is_empty(&self) -> bool {
        self.request_details.is_none()
            && self.response_details.is_none()
            && self.error_details.is_none()
            && self.provider_response.is_none()
    }
}

/// Shared handle to one call's [`HttpDebugState`]
///
/// The handle travels inside the call context so the instrumenting transport
/// and the span can both reach it. Each call gets its own state; clones of the
/// handle point at the same state.
#[derive(Debug, Clone, Default)]
pub struct DebugStateHandle {
    inner: Arc<Mutex<HttpDebugState>>,
}

impl DebugStateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere must not take the diagnostics down with it.
    fn lock(&self) -> MutexGuard<'_, HttpDebugState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn record_request(&self, details: ApiRequestDetails) {
        self.lock().request_details = Some(details);
    }

    /// Records a response, dropping any error left by an earlier attempt
    pub fn record_response(&self, details: ApiResponseDetails) {
        let mut state = self.lock();
        state.response_details = Some(details);
        state.error_details = None;
    }

    pub fn record_error(&self, details: ApiErrorDetails) {
        self.lock().error_details = Some(details);
    }

    /// A copy of the state as it is right now
    pub fn snapshot(&self) -> HttpDebugState {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_state_serializes_to_empty_object() {
        let state = HttpDebugState::default();
        assert!(state.is_empty());
        assert_eq!(serde_json::to_value(&state).unwrap(), json!({}));
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = DebugStateHandle::new();
        let other = handle.clone();
        other.record_response(ApiResponseDetails {
            status: Some(200),
            ..Default::default()
        });

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.response_details.unwrap().status, Some(200));
    }

    #[test]
    fn test_retry_response_clears_earlier_error() {
        let handle = DebugStateHandle::new();
        handle.record_error(ApiErrorDetails {
            message: "connection reset".into(),
            ..Default::default()
        });
        handle.record_response(ApiResponseDetails {
            status: Some(200),
            ..Default::default()
        });

        let snapshot = handle.snapshot();
        assert!(snapshot.error_details.is_none());
        assert_eq!(snapshot.response_details.unwrap().status, Some(200));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let handle = DebugStateHandle::new();
        handle.record_error(ApiErrorDetails {
            message: "boom".into(),
            ..Default::default()
        });

        let mut snapshot = handle.snapshot();
        if let Some(err) = snapshot.error_details.as_mut() {
            err.message.push_str("; more");
        }
        assert_eq!(handle.snapshot().error_details.unwrap().message, "boom");
    }

    #[test]
    fn test_wire_names() {
        let state = HttpDebugState {
            request_details: Some(ApiRequestDetails {
                url: Some("https://api.example.com/v1".into()),
                curl_command: Some("curl".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["requestDetails"]["curlCommand"], "curl");
        assert!(value.get("errorDetails").is_none());
    }
}
