//! The validation engine: presets, wildcard expansion, filter chains and
//! dirty tracking composed into one `validate` pass.

use indexmap::IndexMap;
use log::{debug, trace};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ValidatorError;
use crate::pipeline::{ChainOutcome, run_chain};
use crate::presets::compose;
use crate::primitives::{has_wildcard, resolve_segments, split_path};
use crate::registry::Registry;
use crate::tracker::{FieldState, FieldTracker};
use crate::types::*;
use crate::wildcard::expand_rules;

/// Called once after every successful `validate`.
pub type CompletionListener = Box<dyn Fn(&Validator) + Send + Sync>;

/// Rules, replaces and preset selection of a validator.
#[derive(Clone, Debug, Default)]
pub struct ValidatorOptions {
    pub rules: RuleTable,
    pub replaces: ReplaceTable,
    pub presets: PresetSelection,
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, path: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.rules.insert(path.into(), rule.into());
        self
    }

    pub fn replace(mut self, path: impl Into<String>, replace: impl Into<Replace>) -> Self {
        self.replaces.insert(path.into(), replace.into());
        self
    }

    pub fn presets(mut self, selection: PresetSelection) -> Self {
        self.presets = selection;
        self
    }
}

/// One field scheduled for this run.
struct FieldPlan {
    segments: Vec<String>,
    keys: Vec<PathKey>,
    rule: Rule,
    replace: Option<Replace>,
}

/// Validates records against a rule table and keeps the outcome of the last
/// pass.
pub struct Validator {
    registry: Arc<Registry>,
    options: ValidatorOptions,
    tracker: FieldTracker,
    errors: Option<ErrorMap>,
    messages: Option<MessageMap>,
    valid: bool,
    empty: Option<bool>,
    old_data: Option<Value>,
    listeners: Vec<CompletionListener>,
}

impl Validator {
    /// Creates a validator. List-mode preset names must already be
    /// registered.
    pub fn new(registry: Arc<Registry>, options: ValidatorOptions) -> Result<Self, ValidatorError> {
        let mut validator = Validator {
            registry,
            options: ValidatorOptions::default(),
            tracker: FieldTracker::new(),
            errors: None,
            messages: None,
            valid: true,
            empty: None,
            old_data: None,
            listeners: Vec::new(),
        };
        validator.update(options)?;
        Ok(validator)
    }

    /// Replaces the configuration and starts a new tracking cycle: every
    /// field state, including dirty flags, is dropped.
    pub fn update(&mut self, options: ValidatorOptions) -> Result<(), ValidatorError> {
        if let PresetSelection::List(names) = &options.presets {
            for name in names {
                self.registry.preset(name)?;
            }
        }
        self.options = options;
        self.tracker.reset();
        self.empty = None;
        Ok(())
    }

    /// Runs one complete validation pass over `data`.
    ///
    /// Configuration errors abort the pass and leave the validator exactly
    /// as it was. Otherwise results, flags and field states are replaced,
    /// listeners are notified and `data` is kept as [`old_data`](Self::old_data).
    pub fn validate(&mut self, data: &Value) -> Result<ValidationResult, ValidatorError> {
        let registry = Arc::clone(&self.registry);
        let composition = compose(
            &self.options.rules,
            &self.options.replaces,
            &self.options.presets,
            data,
            registry.presets(),
            registry.expression_evaluator(),
        )?;

        let plan = build_plan(&composition.rules, &composition.replaces, data)?;
        debug!("validating {} fields", plan.len());

        let mut touched = Vec::with_capacity(plan.len());
        let mut errors = ErrorMap::new();
        let mut messages = MessageMap::new();

        for (path, field) in &plan {
            let value = resolve_segments(&field.segments, data);
            touched.push((path.as_str(), value));

            let Some(chain) = resolve_rule(path, &field.rule, data)? else {
                trace!("{}: rule skipped for this run", path);
                continue;
            };
            let label = field
                .replace
                .as_ref()
                .map(|r| r.label(&field.keys))
                .unwrap_or_else(|| path.clone());

            let ChainOutcome {
                failed,
                messages: rendered,
            } = run_chain(
                &chain,
                value,
                &label,
                registry.filters(),
                registry.messages(),
            )?;
            if !failed.is_empty() {
                errors.insert(path.clone(), failed);
                messages.insert(path.clone(), rendered);
            }
        }

        for (path, value) in &touched {
            self.tracker.touch(path, *value);
        }
        self.empty = Some(self.tracker.all_blank(touched.iter().map(|(path, _)| *path)));

        let result = if errors.is_empty() {
            ValidationResult::default()
        } else {
            ValidationResult {
                errors: Some(errors),
                messages: Some(messages),
            }
        };
        self.valid = result.is_valid();
        self.errors = result.errors.clone();
        self.messages = result.messages.clone();
        debug!(
            "validation finished: {} invalid fields",
            self.errors.as_ref().map_or(0, |e| e.len())
        );

        let this: &Validator = self;
        for listener in &this.listeners {
            listener(this);
        }

        self.old_data = Some(data.clone());
        Ok(result)
    }

    /// Records a value for `path` outside of a validation pass.
    pub fn touch(&mut self, path: &str, value: Option<&Value>) -> &FieldState {
        self.tracker.touch(path, value)
    }

    /// Registers a listener fired after every completed `validate`.
    pub fn on_complete<F>(&mut self, listener: F)
    where
        F: Fn(&Validator) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn errors(&self) -> Option<&ErrorMap> {
        self.errors.as_ref()
    }

    pub fn messages(&self) -> Option<&MessageMap> {
        self.messages.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_invalid(&self) -> bool {
        !self.valid
    }

    /// True once any tracked field has changed in the current cycle,
    /// including fields the last pass no longer expanded to.
    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// Whether every field seen by the last pass was blank. Fields tracked
    /// earlier in the cycle but absent from the last pass, such as elements
    /// dropped from an expanded array, do not count. `None` before the first
    /// pass of a cycle.
    pub fn is_empty(&self) -> Option<bool> {
        self.empty
    }

    pub fn field(&self, path: &str) -> Option<&FieldState> {
        self.tracker.get(path)
    }

    pub fn fields(&self) -> &FieldTracker {
        &self.tracker
    }

    pub fn old_data(&self) -> Option<&Value> {
        self.old_data.as_ref()
    }

    /// The configured rules, without preset contributions or expansions.
    pub fn rules(&self) -> &RuleTable {
        &self.options.rules
    }

    pub fn replaces(&self) -> &ReplaceTable {
        &self.options.replaces
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn preset(&self, name: &str) -> Result<&Preset, ValidatorError> {
        self.registry.preset(name)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry for this validator only. The first call copies the shared
    /// registry; other validators keep seeing the original.
    pub fn registry_mut(&mut self) -> &mut Registry {
        Arc::make_mut(&mut self.registry)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("options", &self.options)
            .field("valid", &self.valid)
            .field("errors", &self.errors)
            .field("fields", &self.tracker.len())
            .finish()
    }
}

/// Lays out the fields of one run: every plain rule key, with wildcard keys
/// replaced in place by their expansions. An expansion wins over a plain rule
/// for the same concrete path.
fn build_plan(
    rules: &RuleTable,
    replaces: &ReplaceTable,
    data: &Value,
) -> Result<IndexMap<String, FieldPlan>, ValidatorError> {
    let mut expansions = IndexMap::new();
    for path in rules.keys().filter(|p| has_wildcard(p)) {
        expansions.insert(path.as_str(), expand_rules(&[path.as_str()], rules, replaces, data)?);
    }
    let expanded: HashSet<&str> = expansions
        .values()
        .flatten()
        .map(|field| field.concrete.path.as_str())
        .collect();

    let mut plan = IndexMap::new();
    for (path, rule) in rules {
        if let Some(fields) = expansions.get(path.as_str()) {
            for field in fields {
                plan.insert(
                    field.concrete.path.clone(),
                    FieldPlan {
                        segments: field.concrete.segments.clone(),
                        keys: field.concrete.keys.clone(),
                        rule: field.rule.clone(),
                        replace: field.replace.clone(),
                    },
                );
            }
        } else if !expanded.contains(path.as_str()) {
            plan.insert(
                path.clone(),
                FieldPlan {
                    segments: split_path(path),
                    keys: Vec::new(),
                    rule: rule.clone(),
                    replace: replaces.get(path).cloned(),
                },
            );
        }
    }

    Ok(plan)
}

/// A chain to run, or `None` when a conditional rule opts out.
fn resolve_rule(path: &str, rule: &Rule, data: &Value) -> Result<Option<Chain>, ValidatorError> {
    match rule {
        Rule::Chain(chain) => Ok(Some(chain.clone())),
        Rule::Conditional(f) => Ok(f(data)),
        Rule::PerKey(_) => Err(ValidatorError::InvalidRuleType(path.to_string())),
    }
}
