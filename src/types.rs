use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::primitives::value_to_string;

// ─── Filter chains ──────────────────────────────────────────────────────────

/// One filter invocation: a registered filter name and its raw arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterSpec {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        FilterSpec {
            name: name.into(),
            args,
        }
    }

    /// Parses a single `name` or `name:arg1,arg2` token.
    ///
    /// Only the first `:` separates the name, so arguments may contain
    /// colons. An empty argument list (`name:`) yields no arguments.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.split_once(':') {
            Some((name, "")) => FilterSpec::new(name.trim(), Vec::new()),
            Some((name, args)) => FilterSpec::new(
                name.trim(),
                args.split(',').map(str::to_string).collect(),
            ),
            None => FilterSpec::new(token, Vec::new()),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.args.join(","))
        }
    }
}

/// An ordered sequence of filter invocations applied to one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Chain(Vec<FilterSpec>);

impl Chain {
    /// Parses `filterSpec ("|" filterSpec)*`. Empty tokens are dropped.
    pub fn parse(input: &str) -> Self {
        input
            .split('|')
            .filter(|token| !token.trim().is_empty())
            .map(FilterSpec::parse)
            .collect()
    }

    /// Builds a chain from already split tokens, each using the
    /// `name:arg1,arg2` grammar.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens
            .into_iter()
            .filter(|t| !t.as_ref().trim().is_empty())
            .map(|t| FilterSpec::parse(t.as_ref()))
            .collect()
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<FilterSpec> for Chain {
    fn from_iter<T: IntoIterator<Item = FilterSpec>>(iter: T) -> Self {
        Chain(iter.into_iter().collect())
    }
}

impl From<&str> for Chain {
    fn from(input: &str) -> Self {
        Chain::parse(input)
    }
}

impl From<Vec<FilterSpec>> for Chain {
    fn from(specs: Vec<FilterSpec>) -> Self {
        Chain(specs)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", spec)?;
        }
        Ok(())
    }
}

impl Serialize for Chain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepted chain shapes: `"required|min:4"`, or a sequence whose entries are
/// tokens (`"min:4"`) or structured specs (`{name: min, args: [4]}`).
impl<'de> Deserialize<'de> for Chain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Structured {
            name: String,
            #[serde(default)]
            args: Vec<Value>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Token(String),
            Structured(Structured),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Entries(Vec<Entry>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Ok(Chain::parse(&s)),
            Raw::Entries(entries) => Ok(entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Entry::Token(t) if t.trim().is_empty() => None,
                    Entry::Token(t) => Some(FilterSpec::parse(&t)),
                    Entry::Structured(s) => Some(FilterSpec::new(
                        s.name,
                        s.args.iter().map(value_to_string).collect(),
                    )),
                })
                .collect()),
        }
    }
}

// ─── Wildcard keys ──────────────────────────────────────────────────────────

/// The key found at a wildcard position: an array index or a map key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathKey {
    Index(usize),
    Key(String),
}

impl PathKey {
    /// The path segment this key contributes to a concrete path.
    pub fn segment(&self) -> String {
        match self {
            PathKey::Index(i) => i.to_string(),
            PathKey::Key(k) => k.clone(),
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathKey::Index(i) => Some(*i),
            PathKey::Key(_) => None,
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(i) => write!(f, "{}", i),
            PathKey::Key(k) => write!(f, "{}", k),
        }
    }
}

// ─── Rules ──────────────────────────────────────────────────────────────────

pub type ConditionalFn = Arc<dyn Fn(&Value) -> Option<Chain> + Send + Sync>;
pub type PerKeyRuleFn = Arc<dyn Fn(&[PathKey]) -> Rule + Send + Sync>;
pub type PerKeyLabelFn = Arc<dyn Fn(&[PathKey]) -> String + Send + Sync>;

/// What to run for one field.
#[derive(Clone)]
pub enum Rule {
    /// A fixed filter chain.
    Chain(Chain),
    /// Computed from the whole input on every run; `None` skips the field.
    Conditional(ConditionalFn),
    /// Specialised per wildcard expansion. Receives the keys resolved for
    /// every marker of the path, outermost first.
    PerKey(PerKeyRuleFn),
}

impl Rule {
    pub fn conditional<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Option<Chain> + Send + Sync + 'static,
    {
        Rule::Conditional(Arc::new(f))
    }

    pub fn per_key<F>(f: F) -> Self
    where
        F: Fn(&[PathKey]) -> Rule + Send + Sync + 'static,
    {
        Rule::PerKey(Arc::new(f))
    }

    /// The rule a concrete expansion inherits.
    pub fn specialize(&self, keys: &[PathKey]) -> Rule {
        match self {
            Rule::PerKey(f) => f(keys),
            other => other.clone(),
        }
    }
}

impl From<&str> for Rule {
    fn from(input: &str) -> Self {
        Rule::Chain(Chain::parse(input))
    }
}

impl From<Chain> for Rule {
    fn from(chain: Chain) -> Self {
        Rule::Chain(chain)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Chain(c) => f.debug_tuple("Chain").field(&c.to_string()).finish(),
            Rule::Conditional(_) => f.write_str("Conditional(<fn>)"),
            Rule::PerKey(_) => f.write_str("PerKey(<fn>)"),
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Rule::Chain(a), Rule::Chain(b)) => a == b,
            (Rule::Conditional(a), Rule::Conditional(b)) => Arc::ptr_eq(a, b),
            (Rule::PerKey(a), Rule::PerKey(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ─── Replaces ───────────────────────────────────────────────────────────────

/// Human-readable label used in place of a raw field path in messages.
#[derive(Clone)]
pub enum Replace {
    Label(String),
    /// Varies per wildcard expansion, e.g. `"User 2 name"`.
    PerKey(PerKeyLabelFn),
}

impl Replace {
    pub fn per_key<F>(f: F) -> Self
    where
        F: Fn(&[PathKey]) -> String + Send + Sync + 'static,
    {
        Replace::PerKey(Arc::new(f))
    }

    pub fn label(&self, keys: &[PathKey]) -> String {
        match self {
            Replace::Label(s) => s.clone(),
            Replace::PerKey(f) => f(keys),
        }
    }

    /// The replace a concrete expansion inherits: literals verbatim,
    /// functions invoked with the expansion keys.
    pub fn specialize(&self, keys: &[PathKey]) -> Replace {
        Replace::Label(self.label(keys))
    }
}

impl From<&str> for Replace {
    fn from(label: &str) -> Self {
        Replace::Label(label.to_string())
    }
}

impl From<String> for Replace {
    fn from(label: String) -> Self {
        Replace::Label(label)
    }
}

impl fmt::Debug for Replace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replace::Label(s) => f.debug_tuple("Label").field(s).finish(),
            Replace::PerKey(_) => f.write_str("PerKey(<fn>)"),
        }
    }
}

impl PartialEq for Replace {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Replace::Label(a), Replace::Label(b)) => a == b,
            (Replace::PerKey(a), Replace::PerKey(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

pub type RuleTable = IndexMap<String, Rule>;
pub type ReplaceTable = IndexMap<String, Replace>;

// ─── Presets ────────────────────────────────────────────────────────────────

/// A reusable bundle of rules and replaces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Preset {
    pub rules: RuleTable,
    pub replaces: ReplaceTable,
}

impl Preset {
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
}

/// Result of a rewriting gate.
#[derive(Clone, Debug, PartialEq)]
pub enum GateOutcome {
    Skip,
    Apply,
    /// Use this preset instead of the registered one, for this run only.
    Replace(Preset),
}

pub type PredicateGateFn = Arc<dyn Fn(&Value, &Preset) -> bool + Send + Sync>;
pub type RewriterGateFn = Arc<dyn Fn(&Value, &Preset) -> GateOutcome + Send + Sync>;

/// Decides, per run, whether a preset selected in map mode contributes.
#[derive(Clone)]
pub enum PresetGate {
    Always,
    Never,
    Predicate(PredicateGateFn),
    Rewriter(RewriterGateFn),
    /// A CEL expression over `data`; truthy applies the preset.
    Expression(String),
}

impl PresetGate {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value, &Preset) -> bool + Send + Sync + 'static,
    {
        PresetGate::Predicate(Arc::new(f))
    }

    pub fn rewriter<F>(f: F) -> Self
    where
        F: Fn(&Value, &Preset) -> GateOutcome + Send + Sync + 'static,
    {
        PresetGate::Rewriter(Arc::new(f))
    }
}

impl fmt::Debug for PresetGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetGate::Always => f.write_str("Always"),
            PresetGate::Never => f.write_str("Never"),
            PresetGate::Predicate(_) => f.write_str("Predicate(<fn>)"),
            PresetGate::Rewriter(_) => f.write_str("Rewriter(<fn>)"),
            PresetGate::Expression(e) => f.debug_tuple("Expression").field(e).finish(),
        }
    }
}

/// Which presets contribute to a run.
#[derive(Clone, Debug)]
pub enum PresetSelection {
    /// Every named preset, unconditionally, in order.
    List(Vec<String>),
    /// Each registered name is gated against the data.
    Gated(IndexMap<String, PresetGate>),
}

impl Default for PresetSelection {
    fn default() -> Self {
        PresetSelection::List(Vec::new())
    }
}

impl PresetSelection {
    pub fn is_empty(&self) -> bool {
        match self {
            PresetSelection::List(names) => names.is_empty(),
            PresetSelection::Gated(gates) => gates.is_empty(),
        }
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// path → failed filter name → `true`.
pub type ErrorMap = IndexMap<String, IndexMap<String, bool>>;
/// path → failed filter name → rendered message.
pub type MessageMap = IndexMap<String, IndexMap<String, String>>;

/// Outcome of one validation pass. Both maps are `None` when every field
/// passed, and otherwise cover the same set of paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Option<ErrorMap>,
    pub messages: Option<MessageMap>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// Failed filter names for one field, in chain order.
    pub fn failed_filters(&self, path: &str) -> Vec<&str> {
        self.errors
            .as_ref()
            .and_then(|e| e.get(path))
            .map(|filters| filters.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn message(&self, path: &str, filter: &str) -> Option<&str> {
        self.messages
            .as_ref()?
            .get(path)?
            .get(filter)
            .map(String::as_str)
    }
}
