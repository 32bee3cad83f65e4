use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a caller asks for extended reasoning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReasoningType {
    /// An explicit thinking token budget (`tokens`)
    HybridWithTokens,
    /// A qualitative `level`
    SingleWithLevels,
    /// Anything this version does not understand; treated as "not requested"
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningLevel {
    None,
    Minimal,
    Low,
    Medium,
    High,
    #[serde(rename = "xhigh")]
    XHigh,
    #[serde(other)]
    Unknown,
}

/// What kind of summary should be emitted for the reasoning performed by the model
///
/// Only OpenAI responses honour this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Auto,
    Concise,
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningParam {
    #[serde(rename = "type")]
    pub reasoning_type: ReasoningType,
    #[serde(default = "default_level")]
    pub level: ReasoningLevel,
    #[serde(default)]
    pub tokens: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_style: Option<SummaryStyle>,
}

fn default_level() -> ReasoningLevel {
    ReasoningLevel::None
}

impl ReasoningParam {
    /// Requests thinking with an explicit token budget
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::model::{ReasoningParam, ReasoningType};
    ///
    /// let reasoning = ReasoningParam::with_tokens(4096);
    /// assert_eq!(reasoning.reasoning_type, ReasoningType::HybridWithTokens);
    /// ```
    pub fn with_tokens(tokens: i64) -> Self {
        Self {
            reasoning_type: ReasoningType::HybridWithTokens,
            level: ReasoningLevel::None,
            tokens,
            summary_style: None,
        }
    }

    /// Requests thinking at a qualitative level
    pub fn with_level(level: ReasoningLevel) -> Self {
        Self {
            reasoning_type: ReasoningType::SingleWithLevels,
            level,
            tokens: 0,
            summary_style: None,
        }
    }
}

/// Constrains the verbosity of the model's response
///
/// Supported by OpenAI, not by Anthropic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputVerbosity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormatKind {
    Text,
    JsonSchema,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaParam {
    /// Must be a-z, A-Z, 0-9, underscores and dashes, at most 64 characters
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub schema: Map<String, Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFormat {
    pub kind: OutputFormatKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema_param: Option<JsonSchemaParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<OutputVerbosity>,
}

/// Model selection and sampling settings for one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParam {
    pub name: String,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub max_prompt_length: i64,
    #[serde(default)]
    pub max_output_length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningParam>,
    #[serde(default)]
    pub system_prompt: String,
    /// Seconds; zero means the provider default.
    #[serde(default)]
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_param: Option<OutputParam>,
    /// Anthropic maps these to `stop_sequences`, OpenAI chat to `stop`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default, rename = "additionalParametersRawJSON")]
    pub additional_parameters_raw_json: Option<String>,
}

impl ModelParam {
    /// Creates parameters for the named model with everything else defaulted
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_reasoning(mut self, reasoning: ReasoningParam) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_max_output_length(mut self, max: i64) -> Self {
        self.max_output_length = max;
        self
    }

    /// The requested verbosity, if the caller set one
    pub fn verbosity(&self) -> Option<OutputVerbosity> {
        self.output_param.as_ref().and_then(|p| p.verbosity)
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens_total: i64,
    pub input_tokens_cached: i64,
    pub input_tokens_uncached: i64,
    pub output_tokens: i64,
    pub reasoning_tokens: i64,
}

/// An error reported by the provider inside an otherwise well-formed response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    pub message: String,
}
