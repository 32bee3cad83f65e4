use inference_bridge_core::message::InputTurn;
use inference_bridge_core::model::{ModelParam, ReasoningLevel, ReasoningParam};
use inference_bridge_core::provider::anthropic::{
    DEFAULT_THINKING_BUDGET, Effort, ThinkingConfigParam, ThinkingOverride, analyze_thinking,
    plan_thinking,
};
use inference_bridge_core::tool::{ToolCall, ToolOutput};
use inference_bridge_core::{ContentItem, InputOutputContent, ReasoningContent, Role};
use parameterized::*;

fn weather_call() -> InputTurn {
    InputTurn::FunctionToolCall(ToolCall::new(
        "toolu_01",
        "get_weather",
        r#"{"location":"Oslo"}"#,
    ))
}

fn weather_result() -> InputTurn {
    InputTurn::FunctionToolOutput(ToolOutput::text("toolu_01", "get_weather", "4°C, rain"))
}

fn levels(level: ReasoningLevel) -> ModelParam {
    ModelParam::new("claude-sonnet-4-5").with_reasoning(ReasoningParam::with_level(level))
}

#[parameterized(
    level = {
        ReasoningLevel::Minimal,
        ReasoningLevel::Low,
        ReasoningLevel::Medium,
        ReasoningLevel::High,
        ReasoningLevel::XHigh
    },
    budget = { 1024, 1024, 2048, 8192, 16384 },
    effort = { Effort::Low, Effort::Low, Effort::Medium, Effort::High, Effort::Max }
)]
fn test_level_maps_to_adaptive_budget_and_effort(level: ReasoningLevel, budget: i64, effort: Effort) {
    let e = plan_thinking(&levels(level), &[InputTurn::user_text("hello")]);
    assert!(e.settings.enabled);
    assert!(e.settings.adaptive);
    assert_eq!(e.settings.budget_tokens, budget);
    assert_eq!(e.effort, Some(effort));
    assert_eq!(e.thinking_param(), ThinkingConfigParam::Adaptive);
}

#[parameterized(level = { ReasoningLevel::None, ReasoningLevel::Unknown })]
fn test_level_without_thinking(level: ReasoningLevel) {
    let param = levels(level).with_temperature(0.3);
    let e = plan_thinking(&param, &[InputTurn::user_text("hello")]);
    assert!(!e.settings.enabled);
    assert_eq!(e.settings.budget_tokens, 0);
    assert_eq!(e.effort, None);
    assert_eq!(e.temperature, Some(0.3));
    assert_eq!(e.thinking_param(), ThinkingConfigParam::Disabled);
}

#[test]
fn test_force_disabled_after_plain_tool_round() {
    let turns = vec![
        InputTurn::user_text("What's the weather in Oslo?"),
        weather_call(),
        weather_result(),
    ];
    for level in [ReasoningLevel::Low, ReasoningLevel::XHigh] {
        let e = plan_thinking(&levels(level).with_temperature(0.5), &turns);
        assert!(!e.settings.enabled);
        assert_eq!(e.settings.budget_tokens, 0);
        assert_eq!(e.effort, None);
        assert_eq!(e.temperature, Some(0.5));
    }
    let hybrid = ModelParam::new("claude-sonnet-4-5").with_reasoning(ReasoningParam::with_tokens(9000));
    assert!(!plan_thinking(&hybrid, &turns).settings.enabled);
}

#[test]
fn test_force_enabled_when_tool_result_answers_thinking() {
    let turns = vec![
        InputTurn::user_text("What's the weather in Oslo?"),
        InputTurn::Reasoning(ReasoningContent::signed(
            "EqQBCgIYAhIM1gbcDa9GJwZA2b3hGgxBdjrkzLoky3dl1pk",
            "I should call the weather tool.",
        )),
        weather_call(),
        weather_result(),
    ];
    let analysis = analyze_thinking(&turns);
    assert_eq!(analysis.decision, ThinkingOverride::ForceEnabled);
    assert!(analysis.prev_assistant_starts_thinking);

    let e = plan_thinking(&ModelParam::new("claude-sonnet-4-5").with_temperature(0.9), &turns);
    assert!(e.settings.enabled);
    assert!(!e.settings.adaptive);
    assert!(e.settings.budget_tokens >= DEFAULT_THINKING_BUDGET);
    assert_eq!(e.temperature, None);
    assert_eq!(
        e.thinking_param(),
        ThinkingConfigParam::Enabled {
            budget_tokens: DEFAULT_THINKING_BUDGET
        }
    );
}

#[test]
fn test_fail_safe_when_thinking_not_requested() {
    let turns = vec![
        InputTurn::user_text("first question"),
        InputTurn::Reasoning(ReasoningContent::signed("sig", "considering")),
        InputTurn::Message(InputOutputContent::new(
            Role::Assistant,
            vec![ContentItem::text("first answer")],
        )),
        InputTurn::user_text("second question"),
    ];
    let e = plan_thinking(&levels(ReasoningLevel::None), &turns);
    assert!(e.settings.enabled);
    assert!(!e.settings.adaptive);
    assert_eq!(e.settings.budget_tokens, DEFAULT_THINKING_BUDGET);
    assert_eq!(e.effort, None);
}

#[test]
fn test_hybrid_budget_has_floor() {
    let small = ModelParam::new("m").with_reasoning(ReasoningParam::with_tokens(100));
    let e = plan_thinking(&small, &[InputTurn::user_text("hi")]);
    assert_eq!(e.settings.budget_tokens, DEFAULT_THINKING_BUDGET);
    assert!(!e.settings.adaptive);
    assert_eq!(e.effort, None);

    let fields = e.request_fields();
    assert_eq!(fields["thinking"]["type"], "enabled");
    assert_eq!(fields["thinking"]["budget_tokens"], 1024);
    assert!(!fields.contains_key("output_config"));
}

#[test]
fn test_unsigned_reasoning_from_other_vendor_changes_nothing() {
    let turns = vec![
        InputTurn::user_text("q"),
        InputTurn::Reasoning(ReasoningContent::unsigned("thoughts from another model")),
        weather_call(),
        weather_result(),
    ];
    let analysis = analyze_thinking(&turns);
    assert_eq!(analysis.decision, ThinkingOverride::None);
    assert_eq!(analysis.unsigned, 1);

    let e = plan_thinking(&levels(ReasoningLevel::Medium), &turns);
    assert!(e.settings.adaptive);
    assert_eq!(e.settings.budget_tokens, 2048);
}
