//! The shared configuration every validator reads from.

use std::fmt;
use std::sync::Arc;

use crate::error::{ParseError, ValidatorError};
use crate::evaluate::ExpressionEvaluator;
use crate::filters::{Filter, FilterRegistry};
use crate::messages::{MessageEntry, MessageRegistry};
use crate::presets::PresetRegistry;
use crate::types::Preset;

/// Filters, messages, presets and the gate expression evaluator.
///
/// Build one at startup, register everything, then wrap it in an [`Arc`] and
/// hand it to each [`Validator`](crate::Validator). Cloning is shallow:
/// filters and message functions are shared.
#[derive(Clone, Default)]
pub struct Registry {
    filters: FilterRegistry,
    messages: MessageRegistry,
    presets: PresetRegistry,
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
}

impl Registry {
    /// An empty registry: no filters, no messages, no presets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in filters and the English catalog, plus the CEL evaluator when
    /// the `cel-eval` feature is enabled.
    pub fn with_defaults() -> Self {
        Registry {
            filters: FilterRegistry::with_builtins(),
            messages: MessageRegistry::english(),
            presets: PresetRegistry::new(),
            evaluator: default_evaluator(),
        }
    }

    pub fn set_filter<F: Filter + 'static>(&mut self, name: impl Into<String>, filter: F) {
        self.filters.register(name, filter);
    }

    pub fn filter(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn set_message(&mut self, name: impl Into<String>, entry: MessageEntry) {
        self.messages.set(name, entry);
    }

    pub fn message(&self, name: &str) -> Option<&MessageEntry> {
        self.messages.get(name)
    }

    pub fn messages(&self) -> &MessageRegistry {
        &self.messages
    }

    pub fn load_messages<I, K>(&mut self, catalog: I)
    where
        I: IntoIterator<Item = (K, MessageEntry)>,
        K: Into<String>,
    {
        self.messages.load(catalog);
    }

    pub fn load_messages_yaml(&mut self, input: &str) -> Result<(), ParseError> {
        self.messages.load_yaml(input)
    }

    pub fn set_preset(&mut self, name: impl Into<String>, preset: Preset) -> Result<(), ValidatorError> {
        self.presets.register(name, preset)
    }

    pub fn preset(&self, name: &str) -> Result<&Preset, ValidatorError> {
        self.presets.get(name)
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn set_expression_evaluator<E: ExpressionEvaluator + 'static>(&mut self, evaluator: E) {
        self.evaluator = Some(Arc::new(evaluator));
    }

    pub fn clear_expression_evaluator(&mut self) {
        self.evaluator = None;
    }

    pub fn expression_evaluator(&self) -> Option<&dyn ExpressionEvaluator> {
        self.evaluator.as_deref()
    }
}

#[cfg(feature = "cel-eval")]
fn default_evaluator() -> Option<Arc<dyn ExpressionEvaluator>> {
    Some(Arc::new(crate::evaluate::DefaultCelEvaluator))
}

#[cfg(not(feature = "cel-eval"))]
fn default_evaluator() -> Option<Arc<dyn ExpressionEvaluator>> {
    None
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("filters", &self.filters)
            .field("messages", &self.messages)
            .field("presets", &self.presets)
            .field("evaluator", &self.evaluator.is_some())
            .finish()
    }
}
