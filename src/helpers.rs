//! Conveniences for assembling rule chains and reusing presets under a
//! different path prefix.

use crate::types::{Chain, Preset};

/// Builds a `|`-joined chain string, optionally including specs on a
/// condition.
///
/// ```rust
/// use rulechain::helpers::ChainBuilder;
///
/// let is_admin = false;
/// let chain = ChainBuilder::new()
///     .push("required")
///     .push_if(is_admin, "email")
///     .push("max:40")
///     .build();
/// assert_eq!(chain, "required|max:40");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ChainBuilder {
    specs: Vec<String>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, spec: impl Into<String>) -> Self {
        self.specs.push(spec.into());
        self
    }

    pub fn push_if(self, condition: bool, spec: impl Into<String>) -> Self {
        if condition { self.push(spec) } else { self }
    }

    /// Adds every spec whose flag is set, in order.
    pub fn extend_if<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        self.specs.extend(
            specs
                .into_iter()
                .filter(|(_, enabled)| *enabled)
                .map(|(spec, _)| spec.into()),
        );
        self
    }

    pub fn build(&self) -> String {
        self.specs.join("|")
    }

    pub fn into_chain(self) -> Chain {
        Chain::from_tokens(self.specs)
    }
}

/// Copies a preset with every rule and replace key prefixed by `prefix`.
///
/// The prefix is prepended verbatim, so pass `"billing."` to nest the
/// preset under `billing`.
pub fn prefix_preset(preset: &Preset, prefix: &str) -> Preset {
    rekey_preset(preset, |key| format!("{}{}", prefix, key))
}

/// Copies a preset with every rule and replace key mapped through `f`.
pub fn rekey_preset<F>(preset: &Preset, f: F) -> Preset
where
    F: Fn(&str) -> String,
{
    Preset {
        rules: preset
            .rules
            .iter()
            .map(|(k, v)| (f(k), v.clone()))
            .collect(),
        replaces: preset
            .replaces
            .iter()
            .map(|(k, v)| (f(k), v.clone()))
            .collect(),
    }
}
