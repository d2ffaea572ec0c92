//! YAML schema loading.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::error::{ParseError, ParseErrorKind, ValidatorError};
use crate::messages::MessageEntry;
use crate::types::*;

/// A declarative validation schema.
///
/// ```yaml
/// rules:
///   name: "required|min:4"
///   users.$.email: [required, email]
/// replaces:
///   users.$.email: "User email"
/// presets:
///   address:
///     rules:
///       address.city: required
/// use_presets:
///   address: "data.country == 'FR'"
/// messages:
///   required: "{attribute} cannot be left blank"
/// ```
#[derive(Clone, Debug, Default)]
pub struct Schema {
    pub rules: RuleTable,
    pub replaces: ReplaceTable,
    pub presets: IndexMap<String, Preset>,
    pub use_presets: PresetSelection,
    pub messages: IndexMap<String, MessageEntry>,
}

const TOP_LEVEL_KEYS: &[&str] = &["rules", "replaces", "presets", "use_presets", "messages"];

/// Parse a YAML string into a [`Schema`].
///
/// Rules must be chain strings or sequences of chain entries; any other
/// shape fails with [`ValidatorError::InvalidRuleType`]. Other shape
/// problems are reported as [`ValidatorError::Parse`].
pub fn parse(input: &str) -> Result<Schema, ValidatorError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, "empty input").into());
    }

    let value: Value = serde_saphyr::from_str(input).map_err(|e| saphyr_error(&e.to_string()))?;

    let Value::Object(root) = value else {
        return Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            "schema root must be a YAML mapping",
        )
        .into());
    };

    for key in root.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            return Err(ParseError::new(
                ParseErrorKind::UnknownField,
                format!("unknown top-level field: {}", key),
            )
            .at(key.clone())
            .into());
        }
    }

    let mut schema = Schema::default();
    if let Some(rules) = root.get("rules") {
        schema.rules = rule_table(rules, "rules")?;
    }
    if let Some(replaces) = root.get("replaces") {
        schema.replaces = replace_table(replaces, "replaces")?;
    }
    if let Some(presets) = root.get("presets") {
        for (name, body) in mapping(presets, "presets")? {
            schema
                .presets
                .insert(name.clone(), preset(body, &format!("presets.{}", name))?);
        }
    }
    if let Some(selection) = root.get("use_presets") {
        schema.use_presets = preset_selection(selection)?;
    }
    if let Some(messages) = root.get("messages") {
        schema.messages = serde_json::from_value(messages.clone()).map_err(|e| {
            ParseError::new(ParseErrorKind::TypeMismatch, e.to_string()).at("messages")
        })?;
    }

    Ok(schema)
}

fn mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ParseError> {
    value.as_object().ok_or_else(|| {
        ParseError::new(ParseErrorKind::TypeMismatch, "expected a mapping").at(path)
    })
}

fn rule_table(value: &Value, path: &str) -> Result<RuleTable, ValidatorError> {
    let mut table = RuleTable::new();
    for (field, raw) in mapping(value, path)? {
        let chain: Chain = match raw {
            Value::String(_) | Value::Array(_) => serde_json::from_value(raw.clone())
                .map_err(|_| ValidatorError::InvalidRuleType(field.clone()))?,
            _ => return Err(ValidatorError::InvalidRuleType(field.clone())),
        };
        table.insert(field.clone(), Rule::Chain(chain));
    }
    Ok(table)
}

fn replace_table(value: &Value, path: &str) -> Result<ReplaceTable, ParseError> {
    let mut table = ReplaceTable::new();
    for (field, raw) in mapping(value, path)? {
        let Value::String(label) = raw else {
            return Err(ParseError::new(
                ParseErrorKind::TypeMismatch,
                "replace labels must be strings",
            )
            .at(format!("{}.{}", path, field)));
        };
        table.insert(field.clone(), Replace::Label(label.clone()));
    }
    Ok(table)
}

fn preset(value: &Value, path: &str) -> Result<Preset, ValidatorError> {
    let body = mapping(value, path)?;
    let mut preset = Preset::default();
    for (key, raw) in body {
        match key.as_str() {
            "rules" => preset.rules = rule_table(raw, &format!("{}.rules", path))?,
            "replaces" => preset.replaces = replace_table(raw, &format!("{}.replaces", path))?,
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnknownField,
                    format!("unknown preset field: {}", other),
                )
                .at(format!("{}.{}", path, other))
                .into());
            }
        }
    }
    Ok(preset)
}

/// A sequence selects presets unconditionally; a mapping gates each one with
/// `true`, `false` or an expression string.
fn preset_selection(value: &Value) -> Result<PresetSelection, ParseError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::TypeMismatch, "preset names must be strings")
                        .at("use_presets")
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PresetSelection::List),
        Value::Object(gates) => {
            let mut selection = IndexMap::new();
            for (name, gate) in gates {
                let gate = match gate {
                    Value::Bool(true) => PresetGate::Always,
                    Value::Bool(false) | Value::Null => PresetGate::Never,
                    Value::String(expr) => PresetGate::Expression(expr.clone()),
                    _ => {
                        return Err(ParseError::new(
                            ParseErrorKind::TypeMismatch,
                            "preset gates must be booleans or expression strings",
                        )
                        .at(format!("use_presets.{}", name)));
                    }
                };
                selection.insert(name.clone(), gate);
            }
            Ok(PresetSelection::Gated(selection))
        }
        _ => Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            "use_presets must be a sequence or a mapping",
        )
        .at("use_presets")),
    }
}

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"line (\d+),? column (\d+)").unwrap());

fn saphyr_error(msg: &str) -> ParseError {
    let mut error = ParseError::new(classify_saphyr_error(msg), msg);
    if let Some(caps) = LOCATION_RE.captures(msg) {
        error.line = caps[1].parse().ok();
        error.column = caps[2].parse().ok();
    }
    error
}

fn classify_saphyr_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("type") || lower.contains("invalid") || lower.contains("expected") {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}
