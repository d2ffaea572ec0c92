//! Preset storage and per-run composition of the effective rule tables.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;

use crate::error::{EvaluationError, EvaluationErrorKind, ValidatorError};
use crate::evaluate::{ExpressionEvaluator, evaluate_gate};
use crate::types::{GateOutcome, Preset, PresetGate, PresetSelection, ReplaceTable, RuleTable};

/// Named presets. Registered presets are immutable; a name can only be
/// registered once.
#[derive(Clone, Debug, Default)]
pub struct PresetRegistry {
    presets: IndexMap<String, Preset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, preset: Preset) -> Result<(), ValidatorError> {
        let name = name.into();
        if self.presets.contains_key(&name) {
            return Err(ValidatorError::DuplicatePreset(name));
        }
        self.presets.insert(name, preset);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Preset, ValidatorError> {
        self.presets
            .get(name)
            .ok_or_else(|| ValidatorError::UnknownPreset(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

/// The effective rule and replace tables for one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composition {
    pub rules: RuleTable,
    pub replaces: ReplaceTable,
}

impl Composition {
    fn merge(&mut self, preset: &Preset) {
        for (path, rule) in &preset.rules {
            self.rules.insert(path.clone(), rule.clone());
        }
        for (path, replace) in &preset.replaces {
            self.replaces.insert(path.clone(), replace.clone());
        }
    }
}

/// Merges the base tables with every preset active for `data`.
///
/// The base tables are copied, never modified. In list mode every name must
/// be registered. In map mode names that are not registered are skipped and
/// each gate decides whether its preset applies, is skipped, or is replaced
/// for this run.
pub fn compose(
    base_rules: &RuleTable,
    base_replaces: &ReplaceTable,
    selection: &PresetSelection,
    data: &Value,
    presets: &PresetRegistry,
    evaluator: Option<&dyn ExpressionEvaluator>,
) -> Result<Composition, ValidatorError> {
    let mut composition = Composition {
        rules: base_rules.clone(),
        replaces: base_replaces.clone(),
    };

    match selection {
        PresetSelection::List(names) => {
            for name in names {
                composition.merge(presets.get(name)?);
                debug!("preset {} applied", name);
            }
        }
        PresetSelection::Gated(gates) => {
            for (name, gate) in gates {
                let Ok(registered) = presets.get(name) else {
                    warn!("gated preset {} is not registered, skipping", name);
                    continue;
                };
                match run_gate(name, gate, data, registered, evaluator)? {
                    GateOutcome::Skip => debug!("preset {} skipped by its gate", name),
                    GateOutcome::Apply => {
                        composition.merge(registered);
                        debug!("preset {} applied", name);
                    }
                    GateOutcome::Replace(replacement) => {
                        composition.merge(&replacement);
                        debug!("preset {} applied with gate-supplied contents", name);
                    }
                }
            }
        }
    }

    Ok(composition)
}

fn run_gate(
    name: &str,
    gate: &PresetGate,
    data: &Value,
    preset: &Preset,
    evaluator: Option<&dyn ExpressionEvaluator>,
) -> Result<GateOutcome, ValidatorError> {
    let outcome = match gate {
        PresetGate::Always => GateOutcome::Apply,
        PresetGate::Never => GateOutcome::Skip,
        PresetGate::Predicate(f) if f(data, preset) => GateOutcome::Apply,
        PresetGate::Predicate(_) => GateOutcome::Skip,
        PresetGate::Rewriter(f) => f(data, preset),
        PresetGate::Expression(expression) => {
            let evaluator = evaluator.ok_or_else(|| EvaluationError {
                kind: EvaluationErrorKind::Unavailable,
                message: "no expression evaluator configured".to_string(),
            });
            let applies = evaluator
                .and_then(|ev| evaluate_gate(ev, expression, data))
                .map_err(|e| ValidatorError::GateExpression {
                    preset: name.to_string(),
                    message: e.to_string(),
                })?;
            if applies {
                GateOutcome::Apply
            } else {
                GateOutcome::Skip
            }
        }
    };
    Ok(outcome)
}
