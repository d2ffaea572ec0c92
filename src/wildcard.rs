//! Expansion of wildcard rule paths against the runtime shape of the data.
//!
//! A `$` segment stands for every key present at that position. Markers are
//! resolved left to right from a work-list until no pending path has an
//! unresolved marker left. Concrete paths keep their segments so map keys
//! containing `.` still resolve by position.

use log::trace;
use serde_json::Value;
use std::collections::VecDeque;

use crate::error::ValidatorError;
use crate::primitives::{WILDCARD, join_path, resolve_segments, split_path};
use crate::types::{PathKey, Replace, ReplaceTable, Rule, RuleTable};

/// Upper bound on wildcard markers in a single path.
pub const MAX_WILDCARDS: usize = 32;

/// A fully resolved path produced by expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcretePath {
    /// Dotted form, used as the key in result maps.
    pub path: String,
    /// Segments as found in the data.
    pub segments: Vec<String>,
    /// Keys substituted for each marker, outermost first.
    pub keys: Vec<PathKey>,
}

/// A concrete path together with the rule and replace it inherits.
#[derive(Clone, Debug)]
pub struct ExpandedField {
    pub origin: String,
    pub concrete: ConcretePath,
    pub rule: Rule,
    pub replace: Option<Replace>,
}

struct Pending {
    segments: Vec<String>,
    keys: Vec<PathKey>,
    /// Segments before this index contain no unresolved marker.
    cursor: usize,
}

/// Expands one path into every concrete path the data supports.
///
/// A path without markers yields itself. A marker whose prefix is missing
/// from the data fails with [`ValidatorError::PathNotFound`]; a prefix that
/// holds a scalar has no keys and yields nothing.
pub fn expand_path(path: &str, data: &Value) -> Result<Vec<ConcretePath>, ValidatorError> {
    let segments = split_path(path);
    let markers = segments.iter().filter(|s| s.as_str() == WILDCARD).count();
    if markers > MAX_WILDCARDS {
        return Err(ValidatorError::WildcardDepthExceeded(path.to_string()));
    }

    let mut out = Vec::new();
    let mut queue = VecDeque::from([Pending {
        segments,
        keys: Vec::new(),
        cursor: 0,
    }]);

    while let Some(item) = queue.pop_front() {
        let marker = item.segments[item.cursor..]
            .iter()
            .position(|s| s == WILDCARD)
            .map(|offset| item.cursor + offset);

        let Some(j) = marker else {
            out.push(ConcretePath {
                path: join_path(&item.segments),
                segments: item.segments,
                keys: item.keys,
            });
            continue;
        };

        let prefix = &item.segments[..j];
        let target = resolve_segments(prefix, data)
            .ok_or_else(|| ValidatorError::PathNotFound(join_path(prefix)))?;

        for key in keys_of(target) {
            let mut segments = item.segments.clone();
            segments[j] = key.segment();
            let mut keys = item.keys.clone();
            keys.push(key);
            queue.push_back(Pending {
                segments,
                keys,
                cursor: j + 1,
            });
        }
    }

    trace!("expanded {} into {} concrete paths", path, out.len());
    Ok(out)
}

/// Numeric indices for arrays, native key order for maps, nothing otherwise.
fn keys_of(value: &Value) -> Vec<PathKey> {
    match value {
        Value::Array(arr) => (0..arr.len()).map(PathKey::Index).collect(),
        Value::Object(obj) => obj.keys().map(|k| PathKey::Key(k.clone())).collect(),
        _ => Vec::new(),
    }
}

/// Expands every given rule path and derives the rule and replace of each
/// concrete expansion from the entries registered under the wildcard path.
/// Without a wildcard replace, a replace registered under the concrete path
/// is used.
pub fn expand_rules(
    paths: &[&str],
    rules: &RuleTable,
    replaces: &ReplaceTable,
    data: &Value,
) -> Result<Vec<ExpandedField>, ValidatorError> {
    let mut fields = Vec::new();
    for &origin in paths {
        let Some(rule) = rules.get(origin) else {
            continue;
        };
        let replace = replaces.get(origin);
        for concrete in expand_path(origin, data)? {
            fields.push(ExpandedField {
                origin: origin.to_string(),
                rule: rule.specialize(&concrete.keys),
                replace: replace
                    .map(|r| r.specialize(&concrete.keys))
                    .or_else(|| replaces.get(&concrete.path).cloned()),
                concrete,
            });
        }
    }
    Ok(fields)
}
