use serde::{Deserialize, Serialize};

use crate::content::Role;
use crate::message::{InputTurn, OutputTurn};
use crate::model::{ApiError, ModelParam, Usage};
use crate::tool::{ToolCall, ToolChoice, ToolPolicy};

/// A provider-agnostic completion request
///
/// # Examples
///
/// ```
/// use inference_bridge_core::chat::CompletionRequest;
/// use inference_bridge_core::message::InputTurn;
/// use inference_bridge_core::model::ModelParam;
///
/// let request = CompletionRequest::new(ModelParam::new("claude-sonnet-4-5"))
///     .with_input(InputTurn::user_text("Hello"));
/// assert_eq!(request.inputs.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_param: ModelParam,
    #[serde(default)]
    pub inputs: Vec<InputTurn>,
    /// Optional control on how (or whether) the model may use `tool_choices`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_policy: Option<ToolPolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_choices: Vec<ToolChoice>,
}

impl CompletionRequest {
    pub fn new(model_param: ModelParam) -> Self {
        Self {
            model_param,
            ..Default::default()
        }
    }

    /// Appends a turn and returns self for method chaining
    #[must_use]
    pub fn with_input(mut self, turn: InputTurn) -> Self {
        self.inputs.push(turn);
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: ToolChoice) -> Self {
        self.tool_choices.push(tool);
        self
    }

    #[must_use]
    pub fn with_tool_policy(mut self, policy: ToolPolicy) -> Self {
        self.tool_policy = Some(policy);
        self
    }
}

/// The normalized result of a completion call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<OutputTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// Scrubbed request/response diagnostics for this call, when captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_details: Option<serde_json::Value>,
}

impl CompletionResponse {
    /// Concatenated text of the assistant messages in this response
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .filter_map(|turn| match turn {
                OutputTurn::Message(m) if m.role == Role::Assistant => Some(m.joined_text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Function and custom tool calls, in output order
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.outputs.iter().filter_map(OutputTurn::tool_call).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamContentKind {
    Text,
    Thinking,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub text: String,
}

/// The payload of a streaming event; the `kind` selects exactly one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StreamPayload {
    Text { text: StreamChunk },
    Thinking { thinking: StreamChunk },
}

/// An incremental event delivered to a stream handler while a completion runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub payload: StreamPayload,
}

impl StreamEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: None,
            payload: StreamPayload::Text {
                text: StreamChunk { text: text.into() },
            },
        }
    }

    pub fn thinking(text: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: None,
            payload: StreamPayload::Thinking {
                thinking: StreamChunk { text: text.into() },
            },
        }
    }

    /// Tags the event with the provider and model that produced it
    #[must_use]
    pub fn with_origin(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self.model = Some(model.into());
        self
    }

    pub fn kind(&self) -> StreamContentKind {
        match self.payload {
            StreamPayload::Text { .. } => StreamContentKind::Text,
            StreamPayload::Thinking { .. } => StreamContentKind::Thinking,
        }
    }

    /// The text of the chunk, whichever kind it is
    pub fn chunk_text(&self) -> &str {
        match &self.payload {
            StreamPayload::Text { text } => &text.text,
            StreamPayload::Thinking { thinking } => &thinking.text,
        }
    }
}

/// Library default for `StreamConfig::flush_interval_millis`
pub const DEFAULT_FLUSH_INTERVAL_MILLIS: u64 = 256;
/// Library default for `StreamConfig::flush_chunk_size`
pub const DEFAULT_FLUSH_CHUNK_SIZE: usize = 256;

/// Controls buffering of streamed fragments; zero values mean library defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub flush_interval_millis: u64,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub flush_chunk_size: usize,
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_usize(v: &usize) -> bool {
    *v == 0
}

impl StreamConfig {
    pub fn flush_interval(&self) -> std::time::Duration {
        let millis = if self.flush_interval_millis == 0 {
            DEFAULT_FLUSH_INTERVAL_MILLIS
        } else {
            self.flush_interval_millis
        };
        std::time::Duration::from_millis(millis)
    }

    pub fn chunk_size(&self) -> usize {
        if self.flush_chunk_size == 0 {
            DEFAULT_FLUSH_CHUNK_SIZE
        } else {
            self.flush_chunk_size
        }
    }
}
