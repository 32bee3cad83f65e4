//! Predicates deciding whether a turn carries anything worth sending.
//!
//! Metadata-only values (ids, roles, status with no actual content) count as
//! empty. Function, custom, and web search tool turns are never empty: the
//! payload is always present once the turn exists.

use crate::content::{ContentItem, FileItem, ImageItem, InputOutputContent, ReasoningContent};
use crate::message::{InputTurn, OutputTurn};

/// Reports whether an input turn has nothing worth sending
///
/// # Examples
///
/// ```
/// use inference_bridge_core::empty::is_turn_empty;
/// use inference_bridge_core::message::InputTurn;
///
/// assert!(is_turn_empty(&InputTurn::user_text("")));
/// assert!(!is_turn_empty(&InputTurn::user_text("hi")));
/// ```
pub fn is_turn_empty(turn: &InputTurn) -> bool {
    match turn {
        InputTurn::Message(m) => is_message_empty(m),
        InputTurn::Reasoning(r) => is_reasoning_empty(r),
        InputTurn::FunctionToolCall(_)
        | InputTurn::FunctionToolOutput(_)
        | InputTurn::CustomToolCall(_)
        | InputTurn::CustomToolOutput(_)
        | InputTurn::WebSearchToolCall(_)
        | InputTurn::WebSearchToolOutput(_) => false,
    }
}

/// Same rules as [`is_turn_empty`], for model outputs
pub fn is_output_turn_empty(turn: &OutputTurn) -> bool {
    match turn {
        OutputTurn::Message(m) => is_message_empty(m),
        OutputTurn::Reasoning(r) => is_reasoning_empty(r),
        OutputTurn::FunctionToolCall(_)
        | OutputTurn::CustomToolCall(_)
        | OutputTurn::WebSearchToolCall(_)
        | OutputTurn::WebSearchToolOutput(_) => false,
    }
}

/// A message is empty when it has no items or only empty items.
pub fn is_message_empty(message: &InputOutputContent) -> bool {
    message.contents.iter().all(is_content_item_empty)
}

/// Only reasoning text and encrypted content count; a lone signature does not.
pub fn is_reasoning_empty(reasoning: &ReasoningContent) -> bool {
    reasoning.summary.is_empty()
        && reasoning.thinking.is_empty()
        && reasoning.redacted_thinking.is_empty()
        && reasoning.encrypted_content.is_empty()
}

pub fn is_content_item_empty(item: &ContentItem) -> bool {
    match item {
        ContentItem::Text(t) => t.text.is_empty() && t.citations.is_empty(),
        ContentItem::Refusal(r) => r.refusal.is_empty(),
        ContentItem::Image(img) => is_image_empty(img),
        ContentItem::File(f) => is_file_empty(f),
    }
}

fn is_image_empty(img: &ImageItem) -> bool {
    img.id.is_empty()
        && img.detail.is_none()
        && img.image_name.is_empty()
        && img.image_mime.is_empty()
        && img.image_url.is_empty()
        && img.image_data.is_empty()
}

// The MIME type alone never makes a file worth sending.
fn is_file_empty(f: &FileItem) -> bool {
    f.id.is_empty()
        && f.file_name.is_empty()
        && f.file_url.is_empty()
        && f.file_data.is_empty()
        && f.additional_context.is_empty()
        && f.citation_config.is_none()
}

/// Drops empty turns, keeping the order of the rest
pub fn non_empty_turns(turns: &[InputTurn]) -> impl Iterator<Item = &InputTurn> {
    turns.iter().filter(|t| !is_turn_empty(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        Citation, CitationConfig, ImageDetail, RefusalItem, Role, TextItem, UrlCitation,
    };
    use crate::tool::{ToolCall, ToolOutput};

    #[test]
    fn test_text_item_emptiness() {
        let empty = ContentItem::Text(TextItem {
            text: String::new(),
            citations: vec![],
        });
        assert!(is_content_item_empty(&empty));
        assert!(!is_content_item_empty(&ContentItem::text("hi")));

        let cited_only = ContentItem::Text(TextItem {
            text: String::new(),
            citations: vec![Citation::Url(UrlCitation {
                url: "https://example.com".into(),
                ..Default::default()
            })],
        });
        assert!(!is_content_item_empty(&cited_only));
    }

    #[test]
    fn test_refusal_image_and_file_emptiness() {
        assert!(is_content_item_empty(&ContentItem::Refusal(RefusalItem {
            refusal: String::new()
        })));
        assert!(!is_content_item_empty(&ContentItem::refusal("no")));

        assert!(is_content_item_empty(&ContentItem::Image(ImageItem::default())));
        assert!(!is_content_item_empty(&ContentItem::Image(ImageItem {
            detail: Some(ImageDetail::Auto),
            ..Default::default()
        })));

        let mime_only = FileItem {
            file_mime: "application/pdf".into(),
            ..Default::default()
        };
        assert!(is_content_item_empty(&ContentItem::File(mime_only)));
        assert!(!is_content_item_empty(&ContentItem::File(FileItem {
            citation_config: Some(CitationConfig { enabled: false }),
            ..Default::default()
        })));
    }

    #[test]
    fn test_message_turn_emptiness() {
        let no_items = InputTurn::Message(InputOutputContent::new(Role::User, vec![]));
        assert!(is_turn_empty(&no_items));

        let all_blank = InputTurn::Message(InputOutputContent::new(
            Role::User,
            vec![ContentItem::text(""), ContentItem::refusal("")],
        ));
        assert!(is_turn_empty(&all_blank));

        let one_real = InputTurn::Message(InputOutputContent::new(
            Role::User,
            vec![ContentItem::text(""), ContentItem::text("x")],
        ));
        assert!(!is_turn_empty(&one_real));
    }

    #[test]
    fn test_reasoning_turn_emptiness() {
        let signature_only = ReasoningContent {
            signature: "sig".into(),
            ..Default::default()
        };
        assert!(is_turn_empty(&InputTurn::Reasoning(signature_only)));
        assert!(is_turn_empty(&InputTurn::Reasoning(ReasoningContent::default())));
        assert!(!is_turn_empty(&InputTurn::Reasoning(ReasoningContent::summary(
            "short"
        ))));
    }

    #[test]
    fn test_tool_turns_are_never_empty() {
        let call = InputTurn::FunctionToolCall(ToolCall::new("", "", ""));
        let out = InputTurn::CustomToolOutput(ToolOutput::text("", "", ""));
        assert!(!is_turn_empty(&call));
        assert!(!is_turn_empty(&out));
        assert!(!is_output_turn_empty(&OutputTurn::CustomToolCall(
            ToolCall::new("", "", "")
        )));
    }

    #[test]
    fn test_non_empty_turns_keeps_order() {
        let turns = vec![
            InputTurn::user_text("a"),
            InputTurn::user_text(""),
            InputTurn::assistant_text("b"),
        ];
        let kept: Vec<_> = non_empty_turns(&turns).collect();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].role(), Role::Assistant);
    }
}
