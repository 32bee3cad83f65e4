//! Provider descriptors and the per-vendor policy that shapes requests.
//!
//! Nothing here talks to the network. Adapters call into these modules to
//! decide thinking settings and tool names before building the vendor payload.

pub mod anthropic;
pub mod naming;
pub mod openai;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Secret;
use crate::error::{Error, Result};

pub const DEFAULT_AUTHORIZATION_HEADER_KEY: &str = "Authorization";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_ANTHROPIC_ORIGIN: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_CHAT_COMPLETION_PREFIX: &str = "/v1/messages";
pub const DEFAULT_ANTHROPIC_AUTHORIZATION_HEADER_KEY: &str = "x-api-key";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_OPENAI_ORIGIN: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_CHAT_COMPLETIONS_PREFIX: &str = "/v1/chat/completions";
pub const DEFAULT_OPENAI_RESPONSES_PREFIX: &str = "/v1/responses";

pub const DEFAULT_FILE_DATA_MIME: &str = "application/octet-stream";
pub const DEFAULT_IMAGE_DATA_MIME: &str = "image/png";

/// Which vendor API family a provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderSdkType {
    #[serde(rename = "providerSDKTypeAnthropicMessages")]
    AnthropicMessages,
    #[serde(rename = "providerSDKTypeOpenAIChatCompletions")]
    OpenAIChatCompletions,
    #[serde(rename = "providerSDKTypeOpenAIResponses")]
    OpenAIResponses,
}

/// Connection settings for one provider
///
/// The API key is held in a [`Secret`] and is skipped when the descriptor is
/// serialized, so a `ProviderParam` can be logged or captured safely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderParam {
    pub name: String,
    pub sdk_type: ProviderSdkType,
    #[serde(skip)]
    pub api_key: Secret<String>,
    pub origin: String,
    #[serde(default)]
    pub chat_completion_path_prefix: String,
    #[serde(default)]
    pub api_key_header_key: String,
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl ProviderParam {
    /// Anthropic Messages API with the vendor defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::provider::ProviderParam;
    ///
    /// let provider = ProviderParam::anthropic("sk-ant-123");
    /// assert_eq!(
    ///     provider.endpoint_url().unwrap().as_str(),
    ///     "https://api.anthropic.com/v1/messages"
    /// );
    /// assert!(!format!("{:?}", provider).contains("sk-ant-123"));
    /// ```
    pub fn anthropic(api_key: impl Into<Secret<String>>) -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string());
        Self {
            name: "anthropic".to_string(),
            sdk_type: ProviderSdkType::AnthropicMessages,
            api_key: api_key.into(),
            origin: DEFAULT_ANTHROPIC_ORIGIN.to_string(),
            chat_completion_path_prefix: DEFAULT_ANTHROPIC_CHAT_COMPLETION_PREFIX.to_string(),
            api_key_header_key: DEFAULT_ANTHROPIC_AUTHORIZATION_HEADER_KEY.to_string(),
            default_headers,
        }
    }

    /// OpenAI Chat Completions API with the vendor defaults
    pub fn openai(api_key: impl Into<Secret<String>>) -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            name: "openai".to_string(),
            sdk_type: ProviderSdkType::OpenAIChatCompletions,
            api_key: api_key.into(),
            origin: DEFAULT_OPENAI_ORIGIN.to_string(),
            chat_completion_path_prefix: DEFAULT_OPENAI_CHAT_COMPLETIONS_PREFIX.to_string(),
            api_key_header_key: DEFAULT_AUTHORIZATION_HEADER_KEY.to_string(),
            default_headers,
        }
    }

    /// Full URL of the completion endpoint
    pub fn endpoint_url(&self) -> Result<Url> {
        let origin = self.origin.trim();
        if origin.is_empty() {
            return Err(Error::ProviderUnavailable(format!(
                "provider {} has no origin",
                self.name
            )));
        }
        let base = Url::parse(origin)?;
        let prefix = match self.chat_completion_path_prefix.trim() {
            "" => self.default_prefix(),
            p => p,
        };
        Ok(base.join(prefix)?)
    }

    /// Headers to put on every request, including the API key
    ///
    /// The `Authorization` header gets a `Bearer ` prefix; any other key header
    /// carries the raw key.
    pub fn request_headers(&self) -> Result<BTreeMap<String, String>> {
        if self.api_key.is_empty() {
            return Err(Error::Authentication(format!(
                "no API key configured for {}",
                self.name
            )));
        }
        let mut headers = self.default_headers.clone();
        let key_header = match self.api_key_header_key.trim() {
            "" => DEFAULT_AUTHORIZATION_HEADER_KEY,
            k => k,
        };
        let value = if key_header.eq_ignore_ascii_case(DEFAULT_AUTHORIZATION_HEADER_KEY) {
            format!("Bearer {}", self.api_key.inner())
        } else {
            self.api_key.inner().clone()
        };
        headers.insert(key_header.to_string(), value);
        Ok(headers)
    }

    fn default_prefix(&self) -> &'static str {
        match self.sdk_type {
            ProviderSdkType::AnthropicMessages => DEFAULT_ANTHROPIC_CHAT_COMPLETION_PREFIX,
            ProviderSdkType::OpenAIChatCompletions => DEFAULT_OPENAI_CHAT_COMPLETIONS_PREFIX,
            ProviderSdkType::OpenAIResponses => DEFAULT_OPENAI_RESPONSES_PREFIX,
        }
    }
}
