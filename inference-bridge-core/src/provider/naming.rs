//! Provider-safe tool names and the reverse lookups built on them.
//!
//! Vendors restrict function names to `[a-zA-Z0-9_-]{1,64}`. Callers may
//! declare tools with any name, so each declaration gets a derived name that
//! is sanitized, unique within the request, and at most 64 characters.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::ToolResolutionError;
use crate::tool::{AllowedTool, ToolChoice, ToolType};

/// Hard vendor limit on function name length
pub const MAX_TOOL_NAME_LEN: usize = 64;

const FALLBACK_TOOL_NAME: &str = "tool";

/// A tool declaration paired with the name sent to the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NamedTool<'a> {
    pub choice: &'a ToolChoice,
    pub name: &'a str,
}

/// Derived names for one request's tools, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolNameMapping<'a> {
    choices: Vec<&'a ToolChoice>,
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl<'a> ToolNameMapping<'a> {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Declarations with their derived names, same order and cardinality as the input
    pub fn iter(&self) -> impl Iterator<Item = NamedTool<'_>> + '_ {
        self.choices
            .iter()
            .zip(self.names.iter())
            .map(|(choice, name)| NamedTool {
                choice: *choice,
                name: name.as_str(),
            })
    }

    /// The derived names, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Maps a provider-facing tool name back to its declaration
    ///
    /// Used when normalizing a vendor tool call so it carries the right
    /// `choice_id`.
    pub fn choice_for_name(&self, name: &str) -> Option<&'a ToolChoice> {
        self.by_name
            .get(name)
            .and_then(|&i| self.choices.get(i).copied())
    }

    /// The derived name for the declaration at `index` in the input order
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

/// Assigns short, unique, provider-safe names to tool declarations
///
/// - the base is the lower-cased name with anything outside `[a-z0-9_-]`
///   replaced by `_`, then leading and trailing `_`/`-` trimmed; an empty
///   result becomes `tool`
/// - the base is cut to 64 characters
/// - the first declaration with a base gets the bare base, later ones get
///   `base_2`, `base_3`, ... with the base shortened so the suffix fits
///
/// # Examples
///
/// ```
/// use inference_bridge_core::provider::naming::derive_tool_names;
/// use inference_bridge_core::tool::ToolChoice;
/// use serde_json::json;
///
/// let tools = vec![
///     ToolChoice::function("Foo!", "", json!({})),
///     ToolChoice::function("foo", "", json!({})),
///     ToolChoice::function("FOO ", "", json!({})),
/// ];
/// let mapping = derive_tool_names(&tools);
/// assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["foo", "foo_2", "foo_3"]);
/// ```
pub fn derive_tool_names(tools: &[ToolChoice]) -> ToolNameMapping<'_> {
    let mut mapping = ToolNameMapping {
        choices: Vec::with_capacity(tools.len()),
        names: Vec::with_capacity(tools.len()),
        by_name: HashMap::with_capacity(tools.len()),
    };
    // Both tables live only for this call.
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(tools.len());
    let mut taken: HashSet<String> = HashSet::with_capacity(tools.len());

    for tool in tools {
        let mut base = sanitize_tool_name(&tool.name);
        base.truncate(MAX_TOOL_NAME_LEN);

        let count = seen.entry(base.clone()).or_insert(0);
        let mut name = base.clone();
        if *count > 0 || taken.contains(&name) {
            // A literal "foo_2" declared earlier can already hold the next suffix.
            // Suffixes start at 2 even when the bare base was taken by another tool.
            *count = (*count).max(1);
            loop {
                *count += 1;
                let candidate = with_suffix(&base, *count);
                if !taken.contains(&candidate) {
                    name = candidate;
                    break;
                }
            }
        } else {
            *count = 1;
        }

        trace!(original = %tool.name, derived = %name, "derived tool name");
        taken.insert(name.clone());
        mapping.by_name.insert(name.clone(), mapping.names.len());
        mapping.choices.push(tool);
        mapping.names.push(name);
    }

    mapping
}

fn with_suffix(base: &str, n: usize) -> String {
    let suffix = format!("_{}", n);
    let max_base = MAX_TOOL_NAME_LEN.saturating_sub(suffix.len());
    // Sanitized names are ASCII, so byte slicing is char slicing.
    let trimmed = &base[..base.len().min(max_base)];
    format!("{}{}", trimmed, suffix)
}

/// Lower-cases and replaces every character outside `[a-z0-9_-]` with `_`
pub fn sanitize_tool_name(name: &str) -> String {
    let replaced: String = name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == '_' || c == '-');
    if trimmed.is_empty() {
        FALLBACK_TOOL_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

// Declared names may be non-ASCII; derived names never are.
fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A tool from the allowed subset, as the provider knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAllowedTool {
    pub tool_type: ToolType,
    pub name: String,
}

/// Maps a caller's "allowed subset" onto provider-facing tool names
///
/// Each entry matches the first function or custom declaration (in declaration
/// order) whose id equals the entry's id, when given, and whose original or
/// derived name equals the entry's name ignoring case, when given. Entries with
/// neither field set, and entries that match nothing, are skipped. The call
/// only fails when nothing at all resolves.
///
/// # Errors
///
/// - [`ToolResolutionError::EmptyToolMap`] if no tools were declared
/// - [`ToolResolutionError::EmptyAllowedTools`] if `allowed` is empty
/// - [`ToolResolutionError::NoEligibleTool`] if no entry resolved
pub fn resolve_allowed_tools(
    allowed: &[AllowedTool],
    mapping: &ToolNameMapping<'_>,
) -> Result<Vec<ResolvedAllowedTool>, ToolResolutionError> {
    if mapping.is_empty() {
        return Err(ToolResolutionError::EmptyToolMap);
    }
    if allowed.is_empty() {
        return Err(ToolResolutionError::EmptyAllowedTools);
    }

    let mut resolved = Vec::with_capacity(allowed.len());
    for entry in allowed {
        let want_name = entry.tool_choice_name.trim();
        let want_id = entry.tool_choice_id.trim();
        if want_name.is_empty() && want_id.is_empty() {
            continue;
        }

        let hit = mapping.iter().find(|named| {
            if !want_id.is_empty() && named.choice.id != want_id {
                return false;
            }
            if !want_name.is_empty()
                && !eq_fold(&named.choice.name, want_name)
                && !named.name.eq_ignore_ascii_case(want_name)
            {
                return false;
            }
            matches!(
                named.choice.tool_type(),
                ToolType::Function | ToolType::Custom
            )
        });

        match hit {
            Some(named) => resolved.push(ResolvedAllowedTool {
                tool_type: named.choice.tool_type(),
                name: named.name.to_string(),
            }),
            None => debug!(
                id = want_id,
                name = want_name,
                "allowed tool entry matched no declared tool"
            ),
        }
    }

    if resolved.is_empty() {
        return Err(ToolResolutionError::NoEligibleTool);
    }
    Ok(resolved)
}
