#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{CacheControl, FileItem, ImageItem, Role, Status, TextItem};

/// Name used for a web search tool when the caller does not provide one
pub const DEFAULT_WEB_SEARCH_TOOL_NAME: &str = "webSearchToolChoice";

/// The family a tool declaration, call, or output belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolType {
    Function,
    Custom,
    WebSearch,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::Function => "function",
            ToolType::Custom => "custom",
            ToolType::WebSearch => "webSearch",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchUserLocation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    /// Two letter ISO 3166-1 country code
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    /// IANA timezone
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,
}

/// Web search specific settings of a web search tool declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchArguments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    /// One of `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub search_context_size: String,
    /// Cannot be combined with `blocked_domains`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<WebSearchUserLocation>,
}

/// The type-specific part of a tool declaration
///
/// Function and custom tools carry a free-form argument schema (usually a JSON
/// Schema object); web search tools carry their own settings instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolSpec {
    Function {
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        arguments: Map<String, Value>,
    },
    Custom {
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        arguments: Map<String, Value>,
    },
    WebSearch {
        #[serde(default, rename = "webSearchArguments")]
        web_search_arguments: WebSearchArguments,
    },
}

/// A tool the caller declares as available to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolChoice {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub spec: ToolSpec,
}

impl ToolChoice {
    /// Declares a function tool with the given JSON Schema for its arguments
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::tool::{ToolChoice, ToolType};
    /// use serde_json::json;
    ///
    /// let tool = ToolChoice::function(
    ///     "get_weather",
    ///     "Get current weather for a location",
    ///     json!({"type": "object", "properties": {"location": {"type": "string"}}}),
    /// );
    /// assert_eq!(tool.tool_type(), ToolType::Function);
    /// ```
    pub fn function(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            id: String::new(),
            cache_control: None,
            name: name.into(),
            description: description.into(),
            spec: ToolSpec::Function {
                arguments: object_or_empty(schema),
            },
        }
    }

    /// Declares a custom (free-form input) tool
    pub fn custom(name: impl Into<String>, description: impl Into<String>, schema: Value) -> Self {
        Self {
            id: String::new(),
            cache_control: None,
            name: name.into(),
            description: description.into(),
            spec: ToolSpec::Custom {
                arguments: object_or_empty(schema),
            },
        }
    }

    /// Declares the provider's built-in web search tool
    pub fn web_search(arguments: WebSearchArguments) -> Self {
        Self {
            id: String::new(),
            cache_control: None,
            name: DEFAULT_WEB_SEARCH_TOOL_NAME.to_string(),
            description: String::new(),
            spec: ToolSpec::WebSearch {
                web_search_arguments: arguments,
            },
        }
    }

    /// Declares a function tool whose argument schema is generated from `T`
    #[cfg(feature = "schema")]
    pub fn function_for<T: JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> crate::Result<Self> {
        let schema = schemars::schema_for!(T);
        let schema = serde_json::to_value(schema.schema)?;
        Ok(Self::function(name, description, schema))
    }

    /// Sets the identifier and returns self for method chaining
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache_control: CacheControl) -> Self {
        self.cache_control = Some(cache_control);
        self
    }

    pub fn tool_type(&self) -> ToolType {
        match self.spec {
            ToolSpec::Function { .. } => ToolType::Function,
            ToolSpec::Custom { .. } => ToolType::Custom,
            ToolSpec::WebSearch { .. } => ToolType::WebSearch,
        }
    }

    /// The argument schema of a function or custom tool
    pub fn arguments(&self) -> Option<&Map<String, Value>> {
        match &self.spec {
            ToolSpec::Function { arguments } | ToolSpec::Custom { arguments } => Some(arguments),
            ToolSpec::WebSearch { .. } => None,
        }
    }

    /// Description sent to the provider; falls back to the tool name when blank.
    pub fn description_or_name(&self) -> &str {
        let desc = self.description.trim();
        if desc.is_empty() { &self.name } else { desc }
    }
}

fn object_or_empty(schema: Value) -> Map<String, Value> {
    match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchSource {
    pub url: String,
}

/// One action taken by a web search tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WebSearchCallItem {
    Search {
        query: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        sources: Vec<WebSearchSource>,
        // Opaque in some vendors.
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        input: Map<String, Value>,
    },
    OpenPage {
        url: String,
    },
    Find {
        url: String,
        pattern: String,
    },
}

/// A function or custom tool invocation produced by the model
///
/// Whether this is a function or a custom call is carried by the enclosing
/// turn (`functionToolCall` / `customToolCall`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Identifier of the originating `ToolChoice`, resolved from the call's name
    #[serde(default, rename = "choiceID")]
    pub choice_id: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(default, rename = "callID")]
    pub call_id: String,
    pub name: String,
    /// Arguments as the serialized JSON string the model produced
    #[serde(default)]
    pub arguments: String,
}

impl ToolCall {
    /// Creates a tool call
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::tool::ToolCall;
    ///
    /// let call = ToolCall::new("call_1", "get_weather", r#"{"location":"Paris"}"#);
    /// assert_eq!(call.call_id, "call_1");
    /// ```
    pub fn new(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            choice_id: String::new(),
            id: String::new(),
            role: Role::Assistant,
            status: None,
            cache_control: None,
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[must_use]
    pub fn with_choice_id(mut self, choice_id: impl Into<String>) -> Self {
        self.choice_id = choice_id.into();
        self
    }

    /// Parses the serialized arguments into a typed value
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        let raw = if self.arguments.trim().is_empty() {
            "{}"
        } else {
            self.arguments.as_str()
        };
        Ok(serde_json::from_str(raw)?)
    }
}

/// A provider-executed web search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchToolCall {
    #[serde(default, rename = "choiceID")]
    pub choice_id: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(default, rename = "callID")]
    pub call_id: String,
    #[serde(default = "default_web_search_name")]
    pub name: String,
    #[serde(default, rename = "webSearchToolCallItems")]
    pub items: Vec<WebSearchCallItem>,
}

fn default_web_search_name() -> String {
    DEFAULT_WEB_SEARCH_TOOL_NAME.to_string()
}

impl WebSearchToolCall {
    pub fn new(call_id: impl Into<String>, items: Vec<WebSearchCallItem>) -> Self {
        Self {
            choice_id: String::new(),
            id: String::new(),
            role: Role::Assistant,
            status: None,
            cache_control: None,
            call_id: call_id.into(),
            name: default_web_search_name(),
            items,
        }
    }
}

/// Content returned by a function or custom tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToolOutputItem {
    Text(TextItem),
    Image(ImageItem),
    File(FileItem),
}

/// The result of executing a function or custom tool call
///
/// `call_id` (and `choice_id`) must match a `ToolCall` earlier in the same
/// conversation. Nothing here checks that; provider adapters rely on it when
/// pairing calls with results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    #[serde(default, rename = "choiceID")]
    pub choice_id: String,
    #[serde(default)]
    pub id: String,
    #[serde(default = "tool_role")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(default, rename = "callID")]
    pub call_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ToolOutputItem>,
}

fn tool_role() -> Role {
    Role::Tool
}

impl ToolOutput {
    /// Creates a text result for a tool call
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::tool::ToolOutput;
    ///
    /// let out = ToolOutput::text("call_1", "get_weather", "18°C and sunny");
    /// assert!(!out.is_error);
    /// ```
    pub fn text(
        call_id: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            choice_id: String::new(),
            id: String::new(),
            role: Role::Tool,
            status: None,
            cache_control: None,
            call_id: call_id.into(),
            name: name.into(),
            is_error: false,
            signature: String::new(),
            contents: vec![ToolOutputItem::Text(TextItem {
                text: text.into(),
                citations: Vec::new(),
            })],
        }
    }

    #[must_use]
    pub fn with_choice_id(mut self, choice_id: impl Into<String>) -> Self {
        self.choice_id = choice_id.into();
        self
    }

    #[must_use]
    pub fn with_error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }
}

/// One result of a web search tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WebSearchOutputItem {
    Search {
        url: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        title: String,
        #[serde(
            default,
            skip_serializing_if = "String::is_empty",
            rename = "encryptedContent"
        )]
        encrypted_content: String,
        #[serde(
            default,
            skip_serializing_if = "String::is_empty",
            rename = "renderedContent"
        )]
        rendered_content: String,
        #[serde(default, skip_serializing_if = "String::is_empty", rename = "pageAge")]
        page_age: String,
    },
    Error {
        code: String,
    },
}

/// Results of a provider-executed web search
///
/// Providers emit these on the assistant side of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchToolOutput {
    #[serde(default, rename = "choiceID")]
    pub choice_id: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(default, rename = "callID")]
    pub call_id: String,
    #[serde(default = "default_web_search_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    #[serde(default, rename = "webSearchToolOutputItems")]
    pub items: Vec<WebSearchOutputItem>,
}

impl WebSearchToolOutput {
    pub fn new(call_id: impl Into<String>, items: Vec<WebSearchOutputItem>) -> Self {
        Self {
            choice_id: String::new(),
            id: String::new(),
            role: Role::Assistant,
            status: None,
            cache_control: None,
            call_id: call_id.into(),
            name: default_web_search_name(),
            signature: String::new(),
            items,
        }
    }
}

/// How the model may use the declared tools
///
/// This enum provides a provider-agnostic API for tool choice, mapping to
/// different provider-specific parameters:
///
/// - OpenAI: "auto", "required", "none", a named function, or `allowed_tools`
/// - Anthropic: "auto", "any", "tool", "none"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolPolicyMode {
    /// Allow the model to choose which tool to use (or none)
    #[default]
    Auto,
    /// Require the model to use one of the available (or allowed) tools
    Any,
    /// Require the model to use one specific tool
    Tool,
    /// Force the model not to use any tools
    None,
}

/// One entry of an "allowed subset"; at least one of the fields should be set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedTool {
    #[serde(default, rename = "toolChoiceID")]
    pub tool_choice_id: String,
    #[serde(default, rename = "toolChoiceName")]
    pub tool_choice_name: String,
}

impl AllowedTool {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            tool_choice_id: String::new(),
            tool_choice_name: name.into(),
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            tool_choice_id: id.into(),
            tool_choice_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPolicy {
    #[serde(default)]
    pub mode: ToolPolicyMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_tools: Vec<AllowedTool>,
    #[serde(default)]
    pub disable_parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_choice_wire_shape() {
        let tool = ToolChoice::function(
            "Get Weather",
            "",
            json!({"type": "object", "properties": {}}),
        )
        .with_id("t1");
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["id"], "t1");
        assert_eq!(value["arguments"]["type"], "object");
        assert!(value.get("webSearchArguments").is_none());

        let back: ToolChoice = serde_json::from_value(value).unwrap();
        assert_eq!(back, tool);
        assert_eq!(back.description_or_name(), "Get Weather");
    }

    #[test]
    fn test_web_search_choice_has_no_arguments() {
        let tool = ToolChoice::web_search(WebSearchArguments {
            max_uses: Some(3),
            allowed_domains: vec!["docs.rs".into()],
            ..Default::default()
        });
        assert_eq!(tool.tool_type(), ToolType::WebSearch);
        assert!(tool.arguments().is_none());
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["type"], "webSearch");
        assert_eq!(value["webSearchArguments"]["maxUses"], 3);
    }

    #[test]
    fn test_tool_call_and_output_shapes() {
        let call = ToolCall::new("call_1", "get_weather", "{}").with_choice_id("t1");
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["callID"], "call_1");
        assert_eq!(value["choiceID"], "t1");
        assert_eq!(value["arguments"], "{}");

        let out: ToolOutput = serde_json::from_value(json!({
            "callID": "call_2",
            "name": "grep",
            "contents": [{"kind": "text", "text": "3 matches"}]
        }))
        .unwrap();
        assert_eq!(out.role, Role::Tool);
        assert_eq!(out.contents.len(), 1);
    }

    #[test]
    fn test_parse_arguments() {
        #[derive(Deserialize)]
        struct Args {
            location: String,
        }
        let call = ToolCall::new("c", "get_weather", r#"{"location":"Oslo"}"#);
        let args: Args = call.parse_arguments().unwrap();
        assert_eq!(args.location, "Oslo");

        let empty = ToolCall::new("c", "ping", "  ");
        let v: serde_json::Value = empty.parse_arguments().unwrap();
        assert_eq!(v, json!({}));
    }

    #[test]
    fn test_web_search_items() {
        let call = WebSearchToolCall::new(
            "ws_1",
            vec![WebSearchCallItem::Search {
                query: "rust serde flatten".into(),
                sources: vec![],
                input: Map::new(),
            }],
        );
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["name"], DEFAULT_WEB_SEARCH_TOOL_NAME);
        assert_eq!(value["webSearchToolCallItems"][0]["kind"], "search");

        let out: WebSearchToolOutput = serde_json::from_value(json!({
            "callID": "ws_1",
            "webSearchToolOutputItems": [{"kind": "error", "code": "max_uses_exceeded"}]
        }))
        .unwrap();
        assert_eq!(out.role, Role::Assistant);
        assert_eq!(
            out.items,
            vec![WebSearchOutputItem::Error {
                code: "max_uses_exceeded".into()
            }]
        );
    }

    #[test]
    fn test_tool_policy_defaults() {
        let policy: ToolPolicy = serde_json::from_value(json!({})).unwrap();
        assert_eq!(policy.mode, ToolPolicyMode::Auto);
        assert!(policy.allowed_tools.is_empty());
    }

    #[cfg(feature = "schema")]
    #[test]
    fn test_function_for_schema() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct WeatherRequest {
            location: String,
            units: Option<String>,
        }

        let tool =
            ToolChoice::function_for::<WeatherRequest>("get_weather", "Get weather").unwrap();
        let args = tool.arguments().unwrap();
        assert_eq!(args["type"], "object");
        assert!(args["properties"].get("location").is_some());
    }
}
