//! Redaction of captured payloads.
//!
//! Debug payloads travel to logs and dashboards, so user content and inline
//! binary data are replaced by size markers while ids, roles, status fields,
//! counts and headers are kept.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use inference_bridge_core::secret::REDACTED;
use regex::Regex;
use serde_json::{Map, Value};

use super::DebugError;

/// Deepest nesting the scrubber will walk
pub const MAX_SCRUB_DEPTH: usize = 128;

const MIN_BASE64_RUN: usize = 256;

const CONTENT_KEYS: &[&str] = &[
    "text",
    "thinking",
    "refusal",
    "summary",
    "content",
    "partial_json",
    "arguments",
    "input",
    "renderedContent",
    "additionalContext",
    "system",
    "instructions",
    "redactedThinking",
    "encryptedContent",
    "encrypted_content",
    "data",
    "signature",
];

// Objects under these keys are tool arguments; every string inside is user data.
const TOOL_ARGUMENT_KEYS: &[&str] = &["input", "arguments"];

const BASE64_KEYS: &[&str] = &["imageData", "fileData", "image_url", "b64_json"];

const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "api-key",
    "cookie",
    "set-cookie",
    "proxy-authorization",
    "x-goog-api-key",
];

const SENSITIVE_PARAMS: &[&str] = &["key", "api_key", "apikey", "access_token", "token"];

static BASE64_RUN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/_-]+={0,2}$"));

/// Recursively scrubs a decoded JSON value for debug output
///
/// With `strip_content` off the value comes back unchanged. With it on:
/// - strings under content keys (`text`, `thinking`, `arguments`, ...)
///   become `<redacted: N chars>`, as does every string nested in a
///   tool-argument object (`input`, `arguments`)
/// - strings under base64 keys, `data:` URLs anywhere, and long
///   base64-looking runs become `<base64 omitted: N bytes>`
/// - everything else is kept
///
/// # Errors
///
/// Fails on values nested deeper than [`MAX_SCRUB_DEPTH`].
///
/// # Examples
///
/// ```
/// use inference_bridge_runtime::debug::scrub::scrub_value;
/// use serde_json::json;
///
/// let body = json!({"role": "user", "content": [{"type": "text", "text": "hello"}]});
/// let scrubbed = scrub_value(body, true).unwrap();
/// assert_eq!(
///     scrubbed,
///     json!({"role": "user", "content": [{"type": "text", "text": "<redacted: 5 chars>"}]})
/// );
/// ```
pub fn scrub_value(value: Value, strip_content: bool) -> Result<Value, DebugError> {
    if !strip_content {
        return Ok(value);
    }
    let base64 = BASE64_RUN
        .as_ref()
        .map_err(|e| DebugError::Pattern(e.to_string()))?;
    scrub_at(value, None, false, 0, base64)
}

fn scrub_at(
    value: Value,
    key: Option<&str>,
    in_arguments: bool,
    depth: usize,
    base64: &Regex,
) -> Result<Value, DebugError> {
    if depth > MAX_SCRUB_DEPTH {
        return Err(DebugError::TooDeep(MAX_SCRUB_DEPTH));
    }
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                let arguments =
                    in_arguments || (v.is_object() && TOOL_ARGUMENT_KEYS.contains(&k.as_str()));
                let scrubbed = scrub_at(v, Some(k.as_str()), arguments, depth + 1, base64)?;
                out.insert(k, scrubbed);
            }
            Ok(Value::Object(out))
        }
        // Array elements inherit the key that holds the array.
        Value::Array(items) => items
            .into_iter()
            .map(|v| scrub_at(v, key, in_arguments, depth + 1, base64))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::String(s) => Ok(Value::String(scrub_string(s, key, in_arguments, base64))),
        other => Ok(other),
    }
}

fn scrub_string(s: String, key: Option<&str>, in_arguments: bool, base64: &Regex) -> String {
    let is_base64_key = key.is_some_and(|k| BASE64_KEYS.contains(&k));
    if is_base64_key || is_inline_binary(&s, base64) {
        return format!("<base64 omitted: {} bytes>", s.len());
    }
    if in_arguments || key.is_some_and(|k| CONTENT_KEYS.contains(&k)) {
        return format!("<redacted: {} chars>", s.chars().count());
    }
    s
}

fn is_inline_binary(s: &str, base64: &Regex) -> bool {
    if s.starts_with("data:") {
        return true;
    }
    s.len() >= MIN_BASE64_RUN && base64.is_match(s)
}

/// True for headers that carry credentials
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Copies `headers`, replacing credential values with `[REDACTED]`
///
/// Applied whether or not content stripping is on.
pub fn redact_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| {
            let value = if is_sensitive_header(k) {
                REDACTED.to_string()
            } else {
                v.clone()
            };
            (k.clone(), value)
        })
        .collect()
}

/// Query parameters with credential-looking keys redacted
pub fn redact_params<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            let k = k.as_ref();
            let value = if SENSITIVE_PARAMS.iter().any(|p| p.eq_ignore_ascii_case(k)) {
                REDACTED.to_string()
            } else {
                v.as_ref().to_string()
            };
            (k.to_string(), value)
        })
        .collect()
}
