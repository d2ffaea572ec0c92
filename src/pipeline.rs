//! Execution of a filter chain against one field value.

use indexmap::IndexMap;
use log::trace;
use serde_json::Value;

use crate::error::ValidatorError;
use crate::filters::FilterRegistry;
use crate::messages::MessageRegistry;
use crate::primitives::is_blank;
use crate::types::Chain;

/// The only filter that runs on absent or empty-string values.
pub const REQUIRED: &str = "required";

/// Failures of one chain run, in chain order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainOutcome {
    pub failed: IndexMap<String, bool>,
    pub messages: IndexMap<String, String>,
}

impl ChainOutcome {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs every filter of `chain` against `value`.
///
/// There is no short-circuit: all failures are recorded. Filters other than
/// [`REQUIRED`] are skipped when the value is absent or the empty string.
/// Every filter name must be registered even when it ends up skipped.
pub fn run_chain(
    chain: &Chain,
    value: Option<&Value>,
    attribute: &str,
    filters: &FilterRegistry,
    messages: &MessageRegistry,
) -> Result<ChainOutcome, ValidatorError> {
    let blank = is_blank(value);
    let mut outcome = ChainOutcome::default();

    for spec in chain.specs() {
        let filter = filters
            .get(&spec.name)
            .ok_or_else(|| ValidatorError::UnknownFilter(spec.name.clone()))?;

        if blank && spec.name != REQUIRED {
            trace!("{}: skipping {} on blank value", attribute, spec.name);
            continue;
        }

        if filter.check(value, &spec.args) {
            continue;
        }

        let message = messages.render(&spec.name, value, attribute, &spec.args)?;
        trace!("{}: {} failed", attribute, spec.name);
        outcome.failed.insert(spec.name.clone(), true);
        outcome.messages.insert(spec.name.clone(), message);
    }

    Ok(outcome)
}
