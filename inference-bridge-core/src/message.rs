use serde::{Deserialize, Serialize};

use crate::content::{ContentItem, InputOutputContent, ReasoningContent, Role};
use crate::tool::{ToolCall, ToolOutput, WebSearchToolCall, WebSearchToolOutput};

/// One item of the ordered conversation sent to a provider
///
/// The variant is the turn's kind; its order inside the enclosing `Vec` is the
/// conversation order, which the thinking policy depends on.
///
/// # Examples
///
/// ```
/// use inference_bridge_core::message::InputTurn;
///
/// let turn = InputTurn::user_text("What's the weather in Oslo?");
/// let json = serde_json::to_value(&turn).unwrap();
/// assert_eq!(json["kind"], "message");
/// assert_eq!(json["role"], "user");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputTurn {
    Message(InputOutputContent),
    Reasoning(ReasoningContent),
    FunctionToolCall(ToolCall),
    FunctionToolOutput(ToolOutput),
    CustomToolCall(ToolCall),
    CustomToolOutput(ToolOutput),
    WebSearchToolCall(WebSearchToolCall),
    WebSearchToolOutput(WebSearchToolOutput),
}

impl InputTurn {
    /// Creates a user message with a single text item
    pub fn user_text(text: impl Into<String>) -> Self {
        InputTurn::Message(InputOutputContent::new(
            Role::User,
            vec![ContentItem::text(text)],
        ))
    }

    /// Creates an assistant message with a single text item
    pub fn assistant_text(text: impl Into<String>) -> Self {
        InputTurn::Message(InputOutputContent::new(
            Role::Assistant,
            vec![ContentItem::text(text)],
        ))
    }

    /// Creates a developer message with a single text item
    pub fn developer_text(text: impl Into<String>) -> Self {
        InputTurn::Message(InputOutputContent::new(
            Role::Developer,
            vec![ContentItem::text(text)],
        ))
    }

    /// The wire name of this turn's kind
    pub fn kind(&self) -> &'static str {
        match self {
            InputTurn::Message(_) => "message",
            InputTurn::Reasoning(_) => "reasoning",
            InputTurn::FunctionToolCall(_) => "functionToolCall",
            InputTurn::FunctionToolOutput(_) => "functionToolOutput",
            InputTurn::CustomToolCall(_) => "customToolCall",
            InputTurn::CustomToolOutput(_) => "customToolOutput",
            InputTurn::WebSearchToolCall(_) => "webSearchToolCall",
            InputTurn::WebSearchToolOutput(_) => "webSearchToolOutput",
        }
    }

    /// The role recorded on the turn's payload
    pub fn role(&self) -> Role {
        match self {
            InputTurn::Message(m) => m.role,
            InputTurn::Reasoning(r) => r.role,
            InputTurn::FunctionToolCall(c) | InputTurn::CustomToolCall(c) => c.role,
            InputTurn::FunctionToolOutput(o) | InputTurn::CustomToolOutput(o) => o.role,
            InputTurn::WebSearchToolCall(c) => c.role,
            InputTurn::WebSearchToolOutput(o) => o.role,
        }
    }

    /// True for the result of a function or custom tool, which providers
    /// send back on the user side of the conversation.
    pub fn is_tool_result(&self) -> bool {
        matches!(
            self,
            InputTurn::FunctionToolOutput(_) | InputTurn::CustomToolOutput(_)
        )
    }
}

/// One item produced by the model in a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutputTurn {
    Message(InputOutputContent),
    Reasoning(ReasoningContent),
    FunctionToolCall(ToolCall),
    CustomToolCall(ToolCall),
    WebSearchToolCall(WebSearchToolCall),
    WebSearchToolOutput(WebSearchToolOutput),
}

impl OutputTurn {
    pub fn kind(&self) -> &'static str {
        match self {
            OutputTurn::Message(_) => "message",
            OutputTurn::Reasoning(_) => "reasoning",
            OutputTurn::FunctionToolCall(_) => "functionToolCall",
            OutputTurn::CustomToolCall(_) => "customToolCall",
            OutputTurn::WebSearchToolCall(_) => "webSearchToolCall",
            OutputTurn::WebSearchToolOutput(_) => "webSearchToolOutput",
        }
    }

    /// Returns the function and custom tool calls in this output, if any
    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            OutputTurn::FunctionToolCall(c) | OutputTurn::CustomToolCall(c) => Some(c),
            _ => None,
        }
    }
}

/// Outputs are replayed verbatim as inputs on the next call
impl From<OutputTurn> for InputTurn {
    fn from(turn: OutputTurn) -> Self {
        match turn {
            OutputTurn::Message(m) => InputTurn::Message(m),
            OutputTurn::Reasoning(r) => InputTurn::Reasoning(r),
            OutputTurn::FunctionToolCall(c) => InputTurn::FunctionToolCall(c),
            OutputTurn::CustomToolCall(c) => InputTurn::CustomToolCall(c),
            OutputTurn::WebSearchToolCall(c) => InputTurn::WebSearchToolCall(c),
            OutputTurn::WebSearchToolOutput(o) => InputTurn::WebSearchToolOutput(o),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_kinds_round_trip() {
        let turns = vec![
            InputTurn::user_text("hi"),
            InputTurn::Reasoning(ReasoningContent::signed("sig", "thinking...")),
            InputTurn::FunctionToolCall(ToolCall::new("c1", "get_weather", "{}")),
            InputTurn::FunctionToolOutput(ToolOutput::text("c1", "get_weather", "sunny")),
        ];
        let value = serde_json::to_value(&turns).unwrap();
        assert_eq!(value[0]["kind"], "message");
        assert_eq!(value[1]["kind"], "reasoning");
        assert_eq!(value[2]["kind"], "functionToolCall");
        assert_eq!(value[3]["kind"], "functionToolOutput");

        let back: Vec<InputTurn> = serde_json::from_value(value).unwrap();
        assert_eq!(back, turns);
        assert_eq!(back[3].kind(), "functionToolOutput");
    }

    #[test]
    fn test_unknown_turn_kind_is_rejected() {
        let res = serde_json::from_value::<InputTurn>(json!({"kind": "audio", "role": "user"}));
        assert!(res.is_err());
    }

    #[test]
    fn test_output_turn_cannot_be_tool_output() {
        let res = serde_json::from_value::<OutputTurn>(json!({
            "kind": "functionToolOutput",
            "callID": "c1"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_output_replays_as_input() {
        let out = OutputTurn::CustomToolCall(ToolCall::new("c2", "grep", "pattern"));
        assert!(out.tool_call().is_some());
        let input: InputTurn = out.into();
        assert_eq!(input.kind(), "customToolCall");
        assert_eq!(input.role(), Role::Assistant);
        assert!(!input.is_tool_result());
    }
}
