//! Per-field change tracking across validation passes.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::primitives::values_deep_equal;

/// Current value, previous value and dirty flag of one concrete path.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldState {
    pub value: Value,
    pub old_value: Value,
    pub dirty: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        FieldState {
            value: blank(),
            old_value: blank(),
            dirty: false,
        }
    }
}

fn blank() -> Value {
    Value::String(String::new())
}

fn is_blank_state(state: &FieldState) -> bool {
    matches!(&state.value, Value::String(s) if s.is_empty())
}

/// Field states keyed by concrete path.
///
/// Paths are kept until [`reset`](Self::reset), even when a later pass no
/// longer expands to them, so their dirty flags survive.
#[derive(Clone, Debug, Default)]
pub struct FieldTracker {
    fields: IndexMap<String, FieldState>,
}

impl FieldTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `path`. Absent values are stored as `""`.
    ///
    /// A field becomes dirty once its value differs from the previously
    /// recorded one and stays dirty until [`reset`](Self::reset).
    pub fn touch(&mut self, path: &str, value: Option<&Value>) -> &FieldState {
        let value = value.cloned().unwrap_or_else(blank);
        let state = self.fields.entry(path.to_string()).or_default();
        state.dirty = state.dirty || !values_deep_equal(&value, &state.value);
        state.old_value = std::mem::replace(&mut state.value, value);
        state
    }

    pub fn get(&self, path: &str) -> Option<&FieldState> {
        self.fields.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True iff every tracked value is exactly `""`.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(is_blank_state)
    }

    /// True iff every listed path is tracked with the value `""`.
    pub fn all_blank<'a, I>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        paths
            .into_iter()
            .all(|path| self.fields.get(path).is_some_and(is_blank_state))
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.values().any(|state| state.dirty)
    }

    pub fn reset(&mut self) {
        self.fields.clear();
    }
}
