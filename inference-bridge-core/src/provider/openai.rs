//! OpenAI Chat Completions tool fragments.

use serde_json::{Map, Value, json};
use tracing::trace;

use crate::error::{Error, Result};
use crate::provider::naming::{ResolvedAllowedTool, ToolNameMapping, resolve_allowed_tools};
use crate::tool::{ToolPolicy, ToolPolicyMode, ToolSpec, ToolType};

/// Renders declared tools as Chat Completions `tools` entries
///
/// Web search is not a tool in this API (it is configured through
/// `web_search_options`), so web search declarations are left out.
///
/// # Examples
///
/// ```
/// use inference_bridge_core::provider::naming::derive_tool_names;
/// use inference_bridge_core::provider::openai::tools_param;
/// use inference_bridge_core::tool::ToolChoice;
/// use serde_json::json;
///
/// let tools = vec![ToolChoice::function("Get Weather", "Current weather", json!({"type": "object"}))];
/// let rendered = tools_param(&derive_tool_names(&tools));
/// assert_eq!(rendered[0]["function"]["name"], "get_weather");
/// ```
pub fn tools_param(mapping: &ToolNameMapping<'_>) -> Vec<Value> {
    mapping
        .iter()
        .filter_map(|named| match &named.choice.spec {
            ToolSpec::Function { arguments } => {
                let parameters = if arguments.is_empty() {
                    json!({"type": "object", "properties": {}})
                } else {
                    Value::Object(arguments.clone())
                };
                Some(json!({
                    "type": "function",
                    "function": {
                        "name": named.name,
                        "description": named.choice.description_or_name(),
                        "parameters": parameters,
                    }
                }))
            }
            ToolSpec::Custom { .. } => Some(json!({
                "type": "custom",
                "custom": {
                    "name": named.name,
                    "description": named.choice.description_or_name(),
                }
            })),
            ToolSpec::WebSearch { .. } => {
                trace!(name = named.name, "skipping web search tool for chat completions");
                None
            }
        })
        .collect()
}

fn named_choice(tool: &ResolvedAllowedTool) -> Value {
    match tool.tool_type {
        ToolType::Custom => json!({"type": "custom", "custom": {"name": tool.name}}),
        _ => json!({"type": "function", "function": {"name": tool.name}}),
    }
}

fn allowed_tools_choice(mode: &str, resolved: &[ResolvedAllowedTool]) -> Value {
    json!({
        "type": "allowed_tools",
        "allowed_tools": {
            "mode": mode,
            "tools": resolved.iter().map(named_choice).collect::<Vec<_>>(),
        }
    })
}

/// Renders a tool policy as Chat Completions request fields
///
/// Returns `tool_choice` and, when parallel calls are disabled,
/// `parallel_tool_calls: false`.
///
/// - `auto` / `none` map to the literal strings; `auto` with an allowed subset
///   becomes an `allowed_tools` choice in `auto` mode
/// - `any` maps to `required`, narrowed to the allowed subset when one is given
/// - `tool` forces the first resolved allowed tool
pub fn tool_choice_fields(
    policy: &ToolPolicy,
    mapping: &ToolNameMapping<'_>,
) -> Result<Map<String, Value>> {
    let choice = match policy.mode {
        ToolPolicyMode::None => json!("none"),
        ToolPolicyMode::Auto if policy.allowed_tools.is_empty() => json!("auto"),
        ToolPolicyMode::Auto => {
            let resolved = resolve_allowed_tools(&policy.allowed_tools, mapping)?;
            allowed_tools_choice("auto", &resolved)
        }
        ToolPolicyMode::Any if policy.allowed_tools.is_empty() => json!("required"),
        ToolPolicyMode::Any => {
            let resolved = resolve_allowed_tools(&policy.allowed_tools, mapping)?;
            match resolved.as_slice() {
                [only] => named_choice(only),
                many => allowed_tools_choice("required", many),
            }
        }
        ToolPolicyMode::Tool => {
            let resolved = resolve_allowed_tools(&policy.allowed_tools, mapping)?;
            let first = resolved.first().ok_or_else(|| {
                Error::InvalidArgument("tool policy mode 'tool' needs an allowed tool".into())
            })?;
            named_choice(first)
        }
    };

    let mut fields = Map::new();
    fields.insert("tool_choice".to_string(), choice);
    if policy.disable_parallel && !mapping.is_empty() {
        fields.insert("parallel_tool_calls".to_string(), json!(false));
    }
    Ok(fields)
}
