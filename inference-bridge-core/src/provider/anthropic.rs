//! Anthropic Messages API policy.
//!
//! The Messages API rejects conversations whose thinking settings disagree
//! with the history being replayed: signed or redacted thinking blocks need
//! thinking enabled, and a tool result answering an assistant turn that
//! started with thinking must keep thinking on. [`analyze_thinking`] inspects
//! the conversation and [`resolve_thinking`] turns the caller's request into
//! settings the API accepts.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, trace, warn};

use crate::content::{CacheControl, ReasoningContent, Role};
use crate::empty::is_turn_empty;
use crate::error::{Error, Result};
use crate::message::InputTurn;
use crate::model::{ModelParam, ReasoningLevel, ReasoningType};
use crate::provider::naming::{ToolNameMapping, resolve_allowed_tools};
use crate::tool::{ToolPolicy, ToolPolicyMode, ToolSpec};

/// Budget used when thinking must be on but nothing better was requested
pub const DEFAULT_THINKING_BUDGET: i64 = 1024;

/// Server tool type of Anthropic's hosted web search
pub const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

/// What the conversation forces on the caller's thinking request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThinkingOverride {
    #[default]
    None,
    ForceEnabled,
    ForceDisabled,
}

impl fmt::Display for ThinkingOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThinkingOverride::None => "none",
            ThinkingOverride::ForceEnabled => "forceEnabled",
            ThinkingOverride::ForceDisabled => "forceDisabled",
        })
    }
}

/// Facts about a conversation that decide the thinking override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinkingAnalysis {
    pub decision: ThinkingOverride,
    pub total_reasoning: usize,
    pub signed_or_redacted: usize,
    pub unsigned: usize,
    pub last_user_is_tool_result: bool,
    pub prev_assistant_starts_thinking: bool,
}

/// Scans the ordered conversation and decides whether thinking must be forced
///
/// Empty turns are ignored throughout. The rules, first match wins:
///
/// - no reasoning turns and the last user-authored turn is a tool result:
///   force thinking off
/// - every reasoning turn is signed or redacted, the last user-authored turn
///   is a tool result, and the assistant turn it answers starts with thinking:
///   force thinking on
/// - anything else: no override
///
/// # Examples
///
/// ```
/// use inference_bridge_core::message::InputTurn;
/// use inference_bridge_core::provider::anthropic::{ThinkingOverride, analyze_thinking};
/// use inference_bridge_core::tool::{ToolCall, ToolOutput};
///
/// let turns = vec![
///     InputTurn::user_text("weather in Oslo?"),
///     InputTurn::FunctionToolCall(ToolCall::new("c1", "get_weather", "{}")),
///     InputTurn::FunctionToolOutput(ToolOutput::text("c1", "get_weather", "rain")),
/// ];
/// assert_eq!(analyze_thinking(&turns).decision, ThinkingOverride::ForceDisabled);
/// ```
#[instrument(level = "trace", skip_all, fields(turns = inputs.len()))]
pub fn analyze_thinking(inputs: &[InputTurn]) -> ThinkingAnalysis {
    let mut a = ThinkingAnalysis::default();
    if inputs.is_empty() {
        return a;
    }

    for turn in inputs {
        let InputTurn::Reasoning(r) = turn else {
            continue;
        };
        if is_turn_empty(turn) {
            continue;
        }
        a.total_reasoning += 1;
        if is_signed_or_redacted(r) {
            a.signed_or_redacted += 1;
        } else {
            a.unsigned += 1;
        }
    }

    if let Some((idx, is_tool_result)) = find_last_user_turn(inputs) {
        a.last_user_is_tool_result = is_tool_result;
        if is_tool_result {
            a.prev_assistant_starts_thinking = prev_assistant_starts_with_thinking(inputs, idx);
        }
    }

    a.decision = if a.total_reasoning == 0 {
        if a.last_user_is_tool_result {
            ThinkingOverride::ForceDisabled
        } else {
            ThinkingOverride::None
        }
    } else if a.signed_or_redacted > 0 && a.unsigned == 0 {
        if a.last_user_is_tool_result && a.prev_assistant_starts_thinking {
            ThinkingOverride::ForceEnabled
        } else {
            ThinkingOverride::None
        }
    } else {
        // Mixed or all-unsigned: message conversion drops the unsigned blocks.
        ThinkingOverride::None
    };

    if a.decision != ThinkingOverride::None {
        debug!(
            thinking_override = %a.decision,
            reasoning_total = a.total_reasoning,
            reasoning_signed = a.signed_or_redacted,
            reasoning_unsigned = a.unsigned,
            last_user_is_tool_result = a.last_user_is_tool_result,
            prev_assistant_starts_thinking = a.prev_assistant_starts_thinking,
            "anthropic: thinking override applied"
        );
    }

    a
}

/// True for reasoning the API will accept back verbatim
///
/// That is any non-blank redacted entry, or a non-blank signature together
/// with at least one non-blank thinking entry.
pub fn is_signed_or_redacted(r: &ReasoningContent) -> bool {
    if r.redacted_thinking.iter().any(|s| !s.trim().is_empty()) {
        return true;
    }
    if r.signature.trim().is_empty() {
        return false;
    }
    r.thinking.iter().any(|t| !t.trim().is_empty())
}

/// Index of the last user-authored turn, and whether it is a tool result
fn find_last_user_turn(inputs: &[InputTurn]) -> Option<(usize, bool)> {
    inputs
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, turn)| !is_turn_empty(turn))
        .find_map(|(i, turn)| match turn {
            InputTurn::Message(m) if m.role == Role::User => Some((i, false)),
            InputTurn::FunctionToolOutput(_) | InputTurn::CustomToolOutput(_) => Some((i, true)),
            _ => None,
        })
}

fn is_user_authored(turn: &InputTurn) -> bool {
    if is_turn_empty(turn) {
        return false;
    }
    match turn {
        InputTurn::Message(m) => m.role == Role::User,
        InputTurn::FunctionToolOutput(_) | InputTurn::CustomToolOutput(_) => true,
        _ => false,
    }
}

// Web search results are assistant blocks in the Messages API.
fn is_assistant_authored(turn: &InputTurn) -> bool {
    if is_turn_empty(turn) {
        return false;
    }
    match turn {
        InputTurn::Message(m) => m.role == Role::Assistant,
        InputTurn::Reasoning(_)
        | InputTurn::FunctionToolCall(_)
        | InputTurn::CustomToolCall(_)
        | InputTurn::WebSearchToolCall(_)
        | InputTurn::WebSearchToolOutput(_) => true,
        InputTurn::FunctionToolOutput(_) | InputTurn::CustomToolOutput(_) => false,
    }
}

/// Whether the assistant turn answered by the tool result at `tool_result_idx`
/// opens with signed or redacted reasoning
fn prev_assistant_starts_with_thinking(inputs: &[InputTurn], tool_result_idx: usize) -> bool {
    if tool_result_idx == 0 || tool_result_idx >= inputs.len() {
        return false;
    }

    let start = inputs[..tool_result_idx]
        .iter()
        .rposition(is_user_authored)
        .map_or(0, |prev_user| prev_user + 1);

    inputs[start..tool_result_idx]
        .iter()
        .find(|turn| is_assistant_authored(turn))
        .is_some_and(|turn| matches!(turn, InputTurn::Reasoning(r) if is_signed_or_redacted(r)))
}

/// Thinking settings before or after policy is applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThinkingSettings {
    pub enabled: bool,
    pub adaptive: bool,
    pub budget_tokens: i64,
}

/// The thinking the caller asked for, ignoring the conversation
///
/// Unknown types and levels degrade to "not requested".
pub fn requested_thinking(param: &ModelParam) -> ThinkingSettings {
    let Some(reasoning) = &param.reasoning else {
        return ThinkingSettings::default();
    };
    let adaptive = |budget_tokens| ThinkingSettings {
        enabled: true,
        adaptive: true,
        budget_tokens,
    };
    match reasoning.reasoning_type {
        ReasoningType::HybridWithTokens => ThinkingSettings {
            enabled: true,
            adaptive: false,
            budget_tokens: reasoning.tokens.max(DEFAULT_THINKING_BUDGET),
        },
        ReasoningType::SingleWithLevels => match reasoning.level {
            ReasoningLevel::Minimal | ReasoningLevel::Low => adaptive(1024),
            ReasoningLevel::Medium => adaptive(2048),
            ReasoningLevel::High => adaptive(8192),
            ReasoningLevel::XHigh => adaptive(16384),
            ReasoningLevel::None | ReasoningLevel::Unknown => ThinkingSettings::default(),
        },
        ReasoningType::Unknown => ThinkingSettings::default(),
    }
}

/// Anthropic's `output_config.effort` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
    Max,
}

pub fn effort_for_level(level: ReasoningLevel) -> Option<Effort> {
    match level {
        ReasoningLevel::Minimal | ReasoningLevel::Low => Some(Effort::Low),
        ReasoningLevel::Medium => Some(Effort::Medium),
        ReasoningLevel::High => Some(Effort::High),
        ReasoningLevel::XHigh => Some(Effort::Max),
        ReasoningLevel::None | ReasoningLevel::Unknown => None,
    }
}

/// The `thinking` parameter of a Messages request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ThinkingConfigParam {
    Enabled { budget_tokens: i64 },
    Adaptive,
    Disabled,
}

/// Thinking, effort and temperature settings the API will accept
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectiveThinking {
    pub settings: ThinkingSettings,
    pub effort: Option<Effort>,
    /// Only ever set while thinking is disabled
    pub temperature: Option<f64>,
}

impl EffectiveThinking {
    pub fn thinking_param(&self) -> ThinkingConfigParam {
        match self.settings {
            ThinkingSettings { enabled: false, .. } => ThinkingConfigParam::Disabled,
            ThinkingSettings { adaptive: true, .. } => ThinkingConfigParam::Adaptive,
            ThinkingSettings { budget_tokens, .. } => ThinkingConfigParam::Enabled {
                budget_tokens,
            },
        }
    }

    /// Renders the settings as top-level Messages request fields
    ///
    /// # Examples
    ///
    /// ```
    /// use inference_bridge_core::model::ModelParam;
    /// use inference_bridge_core::provider::anthropic::{ThinkingAnalysis, resolve_thinking};
    ///
    /// let param = ModelParam::new("claude-sonnet-4-5").with_temperature(0.2);
    /// let fields = resolve_thinking(&param, &ThinkingAnalysis::default()).request_fields();
    /// assert_eq!(fields["thinking"]["type"], "disabled");
    /// assert_eq!(fields["temperature"], 0.2);
    /// ```
    pub fn request_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("thinking".to_string(), json!(self.thinking_param()));
        if let Some(t) = self.temperature {
            fields.insert("temperature".to_string(), json!(t));
        }
        if let Some(effort) = self.effort {
            fields.insert("output_config".to_string(), json!({ "effort": effort }));
        }
        fields
    }
}

/// Applies the conversation analysis to the caller's reasoning request
///
/// Never fails; garbled requests resolve to thinking disabled.
pub fn resolve_thinking(param: &ModelParam, analysis: &ThinkingAnalysis) -> EffectiveThinking {
    let mut effective = requested_thinking(param);

    match analysis.decision {
        ThinkingOverride::ForceDisabled => effective = ThinkingSettings::default(),
        ThinkingOverride::ForceEnabled => {
            // Keeps `adaptive` only if the caller asked for levels; never invents it.
            effective.enabled = true;
            if effective.budget_tokens <= 0 {
                effective.budget_tokens = DEFAULT_THINKING_BUDGET;
            }
        }
        ThinkingOverride::None => {}
    }

    if analysis.decision != ThinkingOverride::ForceDisabled
        && !effective.enabled
        && analysis.signed_or_redacted > 0
    {
        warn!(
            provider = "anthropic",
            model = %param.name,
            "anthropic: signed/redacted reasoning present in input but thinking is disabled; enabling thinking as a fail-safe"
        );
        effective = ThinkingSettings {
            enabled: true,
            adaptive: false,
            budget_tokens: DEFAULT_THINKING_BUDGET,
        };
    }

    if !effective.enabled {
        return EffectiveThinking {
            settings: ThinkingSettings::default(),
            effort: None,
            temperature: param.temperature,
        };
    }

    if effective.budget_tokens <= 0 {
        effective.budget_tokens = DEFAULT_THINKING_BUDGET;
    }

    let effort = match &param.reasoning {
        Some(r)
            if effective.adaptive
                && r.reasoning_type == ReasoningType::SingleWithLevels
                && param.verbosity().is_none() =>
        {
            effort_for_level(r.level)
        }
        _ => None,
    };

    trace!(?effective, ?effort, "anthropic: effective thinking");
    EffectiveThinking {
        settings: effective,
        effort,
        temperature: None,
    }
}

/// Analyzes the conversation and resolves thinking in one step
pub fn plan_thinking(param: &ModelParam, inputs: &[InputTurn]) -> EffectiveThinking {
    let analysis = analyze_thinking(inputs);
    resolve_thinking(param, &analysis)
}

fn cache_control_value(cache: &CacheControl) -> Value {
    match cache {
        CacheControl::Ephemeral { ttl } if ttl.is_empty() => json!({"type": "ephemeral"}),
        CacheControl::Ephemeral { ttl } => json!({"type": "ephemeral", "ttl": ttl}),
    }
}

/// Renders declared tools as Messages API `tools` entries
///
/// Function and custom tools become client tools named by their derived name.
/// Web search becomes the hosted `web_search` server tool.
pub fn tools_param(mapping: &ToolNameMapping<'_>) -> Vec<Value> {
    mapping
        .iter()
        .map(|named| {
            let mut tool = match &named.choice.spec {
                ToolSpec::Function { arguments } | ToolSpec::Custom { arguments } => {
                    let schema = if arguments.is_empty() {
                        json!({"type": "object", "properties": {}})
                    } else {
                        Value::Object(arguments.clone())
                    };
                    json!({
                        "name": named.name,
                        "description": named.choice.description_or_name(),
                        "input_schema": schema,
                    })
                }
                ToolSpec::WebSearch {
                    web_search_arguments: args,
                } => {
                    let mut tool = json!({
                        "type": WEB_SEARCH_TOOL_TYPE,
                        "name": WEB_SEARCH_TOOL_NAME,
                    });
                    if let Some(max_uses) = args.max_uses {
                        tool["max_uses"] = json!(max_uses);
                    }
                    if !args.allowed_domains.is_empty() {
                        tool["allowed_domains"] = json!(args.allowed_domains);
                    } else if !args.blocked_domains.is_empty() {
                        tool["blocked_domains"] = json!(args.blocked_domains);
                    }
                    if let Some(loc) = &args.user_location {
                        let mut location = serde_json::to_value(loc).unwrap_or(Value::Null);
                        location["type"] = json!("approximate");
                        tool["user_location"] = location;
                    }
                    tool
                }
            };
            if let Some(cache) = &named.choice.cache_control {
                tool["cache_control"] = cache_control_value(cache);
            }
            tool
        })
        .collect()
}

/// Renders a tool policy as the Messages API `tool_choice`
///
/// The API has no "allowed subset" form: `any` with exactly one allowed tool
/// becomes a named `tool` choice, otherwise `any`. `tool` mode requires an
/// allowed subset and uses its first resolved entry.
pub fn tool_choice_param(policy: &ToolPolicy, mapping: &ToolNameMapping<'_>) -> Result<Value> {
    let mut choice = match policy.mode {
        ToolPolicyMode::Auto => json!({"type": "auto"}),
        ToolPolicyMode::None => json!({"type": "none"}),
        ToolPolicyMode::Any if policy.allowed_tools.is_empty() => json!({"type": "any"}),
        ToolPolicyMode::Any => {
            let resolved = resolve_allowed_tools(&policy.allowed_tools, mapping)?;
            match resolved.as_slice() {
                [only] => json!({"type": "tool", "name": only.name}),
                _ => json!({"type": "any"}),
            }
        }
        ToolPolicyMode::Tool => {
            let resolved = resolve_allowed_tools(&policy.allowed_tools, mapping)?;
            let first = resolved.first().ok_or_else(|| {
                Error::InvalidArgument("tool policy mode 'tool' needs an allowed tool".into())
            })?;
            json!({"type": "tool", "name": first.name})
        }
    };
    if policy.disable_parallel && policy.mode != ToolPolicyMode::None {
        choice["disable_parallel_tool_use"] = json!(true);
    }
    Ok(choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolResolutionError;
    use crate::model::{OutputParam, OutputVerbosity, ReasoningParam};
    use crate::provider::naming::derive_tool_names;
    use crate::tool::{AllowedTool, ToolCall, ToolChoice, ToolOutput, WebSearchArguments};
    use tracing_test::traced_test;

    fn tool_result() -> InputTurn {
        InputTurn::FunctionToolOutput(ToolOutput::text("c1", "get_weather", "sunny"))
    }

    fn tool_call() -> InputTurn {
        InputTurn::FunctionToolCall(ToolCall::new("c1", "get_weather", "{}"))
    }

    #[test]
    fn test_signed_or_redacted_classification() {
        assert!(is_signed_or_redacted(&ReasoningContent::signed("sig", "x")));
        assert!(is_signed_or_redacted(&ReasoningContent::redacted("opaque")));
        assert!(!is_signed_or_redacted(&ReasoningContent::signed("  ", "x")));
        assert!(!is_signed_or_redacted(&ReasoningContent::signed("sig", "   ")));
        assert!(!is_signed_or_redacted(&ReasoningContent::redacted(" ")));
        assert!(!is_signed_or_redacted(&ReasoningContent::unsigned("x")));
    }

    #[test]
    fn test_empty_conversation_has_no_override() {
        assert_eq!(analyze_thinking(&[]), ThinkingAnalysis::default());
    }

    #[test]
    fn test_last_user_message_is_not_tool_result() {
        let turns = vec![tool_call(), tool_result(), InputTurn::user_text("thanks")];
        let a = analyze_thinking(&turns);
        assert!(!a.last_user_is_tool_result);
        assert_eq!(a.decision, ThinkingOverride::None);
    }

    #[test]
    fn test_empty_turns_are_skipped() {
        let turns = vec![
            InputTurn::user_text("q"),
            InputTurn::Reasoning(ReasoningContent::default()),
            tool_call(),
            tool_result(),
            InputTurn::user_text(""),
        ];
        let a = analyze_thinking(&turns);
        assert_eq!(a.total_reasoning, 0);
        assert!(a.last_user_is_tool_result);
        assert_eq!(a.decision, ThinkingOverride::ForceDisabled);
    }

    #[test]
    fn test_prev_assistant_must_start_with_thinking() {
        let turns = vec![
            InputTurn::user_text("q"),
            tool_call(),
            InputTurn::Reasoning(ReasoningContent::signed("sig", "late thought")),
            tool_result(),
        ];
        let a = analyze_thinking(&turns);
        assert!(!a.prev_assistant_starts_thinking);
        assert_eq!(a.decision, ThinkingOverride::None);
    }

    #[test]
    fn test_tool_result_at_start_has_no_previous_assistant() {
        let a = analyze_thinking(&[tool_result()]);
        assert!(a.last_user_is_tool_result);
        assert!(!a.prev_assistant_starts_thinking);
    }

    #[test]
    fn test_mixed_reasoning_applies_no_override() {
        let turns = vec![
            InputTurn::user_text("q"),
            InputTurn::Reasoning(ReasoningContent::signed("sig", "signed")),
            InputTurn::Reasoning(ReasoningContent::unsigned("unsigned")),
            tool_call(),
            tool_result(),
        ];
        let a = analyze_thinking(&turns);
        assert_eq!((a.signed_or_redacted, a.unsigned), (1, 1));
        assert_eq!(a.decision, ThinkingOverride::None);
    }

    #[test]
    fn test_requested_thinking_mapping() {
        let p = ModelParam::new("m").with_reasoning(ReasoningParam::with_tokens(10));
        assert_eq!(
            requested_thinking(&p),
            ThinkingSettings {
                enabled: true,
                adaptive: false,
                budget_tokens: DEFAULT_THINKING_BUDGET
            }
        );
        let p = ModelParam::new("m").with_reasoning(ReasoningParam::with_tokens(5000));
        assert_eq!(requested_thinking(&p).budget_tokens, 5000);
        assert_eq!(
            requested_thinking(&ModelParam::new("m")),
            ThinkingSettings::default()
        );
    }

    #[test]
    fn test_force_enabled_keeps_requested_shape() {
        let analysis = ThinkingAnalysis {
            decision: ThinkingOverride::ForceEnabled,
            signed_or_redacted: 1,
            ..Default::default()
        };
        let levels = ModelParam::new("m").with_reasoning(ReasoningParam::with_level(ReasoningLevel::High));
        let e = resolve_thinking(&levels, &analysis);
        assert!(e.settings.adaptive);
        assert_eq!(e.settings.budget_tokens, 8192);
        assert_eq!(e.effort, Some(Effort::High));

        let plain = ModelParam::new("m").with_temperature(0.7);
        let e = resolve_thinking(&plain, &analysis);
        assert!(e.settings.enabled);
        assert!(!e.settings.adaptive);
        assert_eq!(e.settings.budget_tokens, DEFAULT_THINKING_BUDGET);
        assert_eq!(e.temperature, None);
    }

    #[test]
    fn test_verbosity_suppresses_effort() {
        let mut p =
            ModelParam::new("m").with_reasoning(ReasoningParam::with_level(ReasoningLevel::Medium));
        p.output_param = Some(OutputParam {
            format: None,
            verbosity: Some(OutputVerbosity::High),
        });
        let e = resolve_thinking(&p, &ThinkingAnalysis::default());
        assert!(e.settings.enabled);
        assert_eq!(e.effort, None);
    }

    #[test]
    fn test_request_fields_shapes() {
        let e = EffectiveThinking {
            settings: ThinkingSettings {
                enabled: true,
                adaptive: false,
                budget_tokens: 2048,
            },
            effort: None,
            temperature: None,
        };
        let fields = e.request_fields();
        assert_eq!(
            fields["thinking"],
            json!({"type": "enabled", "budget_tokens": 2048})
        );
        assert!(!fields.contains_key("temperature"));

        let adaptive = EffectiveThinking {
            settings: ThinkingSettings {
                enabled: true,
                adaptive: true,
                budget_tokens: 16384,
            },
            effort: Some(Effort::Max),
            temperature: None,
        };
        let fields = adaptive.request_fields();
        assert_eq!(fields["thinking"], json!({"type": "adaptive"}));
        assert_eq!(fields["output_config"], json!({"effort": "max"}));
    }

    #[test]
    fn test_tools_param() {
        let tools = vec![
            ToolChoice::function("Get Weather", "", json!({}))
                .with_cache_control(CacheControl::Ephemeral { ttl: "1h".into() }),
            ToolChoice::web_search(WebSearchArguments {
                max_uses: Some(2),
                ..Default::default()
            }),
        ];
        let mapping = derive_tool_names(&tools);
        let rendered = tools_param(&mapping);
        assert_eq!(rendered[0]["name"], "get_weather");
        assert_eq!(rendered[0]["description"], "Get Weather");
        assert_eq!(rendered[0]["input_schema"]["type"], "object");
        assert_eq!(rendered[0]["cache_control"], json!({"type": "ephemeral", "ttl": "1h"}));
        assert_eq!(rendered[1]["type"], WEB_SEARCH_TOOL_TYPE);
        assert_eq!(rendered[1]["max_uses"], 2);
    }

    #[test]
    fn test_tool_choice_param() {
        let tools = vec![
            ToolChoice::function("search", "", json!({})),
            ToolChoice::function("fetch", "", json!({})),
        ];
        let mapping = derive_tool_names(&tools);

        let auto = ToolPolicy {
            disable_parallel: true,
            ..Default::default()
        };
        assert_eq!(
            tool_choice_param(&auto, &mapping).unwrap(),
            json!({"type": "auto", "disable_parallel_tool_use": true})
        );

        let one = ToolPolicy {
            mode: ToolPolicyMode::Any,
            allowed_tools: vec![AllowedTool::by_name("Fetch")],
            disable_parallel: false,
        };
        assert_eq!(
            tool_choice_param(&one, &mapping).unwrap(),
            json!({"type": "tool", "name": "fetch"})
        );

        let missing = ToolPolicy {
            mode: ToolPolicyMode::Tool,
            ..Default::default()
        };
        assert!(matches!(
            tool_choice_param(&missing, &mapping),
            Err(Error::ToolResolution(ToolResolutionError::EmptyAllowedTools))
        ));
    }

    #[traced_test]
    #[test]
    fn test_override_is_logged() {
        let turns = vec![InputTurn::user_text("q"), tool_call(), tool_result()];
        analyze_thinking(&turns);
        assert!(logs_contain("anthropic: thinking override applied"));
        assert!(logs_contain("thinking_override=forceDisabled"));
    }

    #[traced_test]
    #[test]
    fn test_fail_safe_is_logged() {
        let turns = vec![
            InputTurn::user_text("q"),
            InputTurn::Reasoning(ReasoningContent::redacted("opaque")),
            InputTurn::assistant_text("done"),
            InputTurn::user_text("next"),
        ];
        let param = ModelParam::new("claude-opus-4-1").with_temperature(1.0);
        let e = plan_thinking(&param, &turns);
        assert!(e.settings.enabled);
        assert!(!e.settings.adaptive);
        assert_eq!(e.settings.budget_tokens, DEFAULT_THINKING_BUDGET);
        assert_eq!(e.temperature, None);
        assert!(logs_contain("enabling thinking as a fail-safe"));
    }
}
