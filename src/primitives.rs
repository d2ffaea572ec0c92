//! Shared value and path utilities used by the expander, the filter pipeline
//! and the field tracker.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Path segment meaning "every key at this position".
pub const WILDCARD: &str = "$";

/// Separator between path segments.
pub const SEPARATOR: char = '.';

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

// ─── Paths ──────────────────────────────────────────────────────────────────

/// Splits a dotted path into owned segments. The empty path has no segments.
pub fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(SEPARATOR).map(str::to_string).collect()
}

/// Joins segments back into a dotted path.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(seg.as_ref());
    }
    out
}

/// Returns true if any segment of `path` is the wildcard marker.
pub fn has_wildcard(path: &str) -> bool {
    path.split(SEPARATOR).any(|seg| seg == WILDCARD)
}

/// Resolves already-split segments against a value tree.
///
/// Objects are indexed by key, arrays by a decimal index. Returns `None` as
/// soon as a segment does not resolve. No segments returns the root.
pub fn resolve_segments<'a, S: AsRef<str>>(segments: &[S], value: &'a Value) -> Option<&'a Value> {
    let mut current = value;
    for segment in segments {
        let segment = segment.as_ref();
        current = match current {
            Value::Object(obj) => obj.get(segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

// ─── Values ─────────────────────────────────────────────────────────────────

/// Deep equality: integer 42 equals float 42.0, object key order is
/// irrelevant, arrays compare element-wise.
pub fn values_deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => a == b,
        },
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| values_deep_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() != b.len() {
                return false;
            }
            a.iter()
                .all(|(k, v)| b.get(k).is_some_and(|bv| values_deep_equal(v, bv)))
        }
        _ => false,
    }
}

/// Runtime type name of a possibly absent value, used to pick type-keyed
/// message templates.
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Absent or the empty string. Filters other than `required` are skipped for
/// blank values.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// JavaScript-style truthiness, used for gate and expression results.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Plain-text rendering of a value: strings unquoted, everything else as
/// compact JSON.
pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        _ => serde_json::to_string(v).unwrap_or_default(),
    }
}

// ─── Templates ──────────────────────────────────────────────────────────────

/// Substitutes `{name}` placeholders using `lookup`.
///
/// Unknown names render as the empty string. Nothing in the template is ever
/// evaluated; `{{` and `}}` escape literal braces.
pub fn interpolate_template<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    const OPEN: &str = "\x00ESCAPED_OPEN_BRACE\x00";
    const CLOSE: &str = "\x00ESCAPED_CLOSE_BRACE\x00";
    let working = template.replace("{{", OPEN).replace("}}", CLOSE);

    let replaced = PLACEHOLDER_RE.replace_all(&working, |caps: &regex::Captures<'_>| {
        lookup(&caps[1]).unwrap_or_default()
    });

    replaced.replace(OPEN, "{").replace(CLOSE, "}")
}

/// Named arguments for message templates: `attribute`, then `arg1`, `arg2`, ...
pub fn message_argument(name: &str, attribute: &str, args: &[String]) -> Option<String> {
    if name == "attribute" {
        return Some(attribute.to_string());
    }
    let n: usize = name.strip_prefix("arg")?.parse().ok()?;
    if n == 0 {
        return None;
    }
    args.get(n - 1).cloned()
}
