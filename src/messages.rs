//! Message templates keyed by filter name, optionally by value type.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{ParseError, ParseErrorKind, ValidatorError};
use crate::primitives::{interpolate_template, message_argument, type_name};

/// Entry used when no message is registered for a failing filter.
pub const UNDEFINED_MESSAGE: &str = "undefined";

/// Last resort when even [`UNDEFINED_MESSAGE`] is missing.
const FALLBACK_TEMPLATE: &str = "The field {attribute} is invalid";

const ENGLISH_CATALOG: &str = include_str!("../lang/en.yaml");

pub type MessageFn = Arc<dyn Fn(&str, &[String]) -> String + Send + Sync>;

/// Produces the text for one failure from the field label and the filter
/// arguments.
#[derive(Clone)]
pub enum Renderer {
    /// Named-placeholder template: `{attribute}`, `{arg1}`, `{arg2}`, ...
    Template(String),
    Func(MessageFn),
}

impl Renderer {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        Renderer::Func(Arc::new(f))
    }

    pub fn render(&self, attribute: &str, args: &[String]) -> String {
        match self {
            Renderer::Template(t) => {
                interpolate_template(t, |name| message_argument(name, attribute, args))
            }
            Renderer::Func(f) => f(attribute, args),
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Renderer::Func(_) => f.write_str("Func(<fn>)"),
        }
    }
}

/// A message registered under a filter name.
#[derive(Clone, Debug)]
pub enum MessageEntry {
    Single(Renderer),
    /// Keyed by the runtime type name of the failing value.
    ByType(IndexMap<String, Renderer>),
}

impl MessageEntry {
    pub fn template(t: impl Into<String>) -> Self {
        MessageEntry::Single(Renderer::Template(t.into()))
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
    {
        MessageEntry::Single(Renderer::func(f))
    }

    pub fn by_type<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<String>,
    {
        MessageEntry::ByType(
            entries
                .into_iter()
                .map(|(k, t)| (k.into(), Renderer::Template(t.into())))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for MessageEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Template(String),
            ByType(IndexMap<String, String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Template(t) => MessageEntry::template(t),
            Raw::ByType(map) => MessageEntry::by_type(map),
        })
    }
}

/// Message templates indexed by filter name.
#[derive(Clone, Debug, Default)]
pub struct MessageRegistry {
    entries: IndexMap<String, MessageEntry>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default English catalog.
    pub fn english() -> Self {
        let mut registry = Self::new();
        registry
            .load_yaml(ENGLISH_CATALOG)
            .expect("embedded English catalog is valid YAML");
        registry.set(
            "boolean",
            MessageEntry::func(|attribute, args| {
                let expected = match args.first().map(String::as_str) {
                    None | Some("true") => "true",
                    Some(_) => "false",
                };
                format!("The field {} must be checked as {}", attribute, expected)
            }),
        );
        registry
    }

    pub fn set(&mut self, name: impl Into<String>, entry: MessageEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&MessageEntry> {
        self.entries.get(name)
    }

    /// Bulk import; later entries overwrite earlier ones.
    pub fn load<I, K>(&mut self, catalog: I)
    where
        I: IntoIterator<Item = (K, MessageEntry)>,
        K: Into<String>,
    {
        for (name, entry) in catalog {
            self.set(name, entry);
        }
    }

    /// Bulk import from a YAML mapping of `name: template` or
    /// `name: {type: template}` entries.
    pub fn load_yaml(&mut self, input: &str) -> Result<(), ParseError> {
        let value: Value = serde_saphyr::from_str(input)
            .map_err(|e| ParseError::new(ParseErrorKind::Syntax, e.to_string()))?;
        let catalog: IndexMap<String, MessageEntry> = serde_json::from_value(value)
            .map_err(|e| ParseError::new(ParseErrorKind::TypeMismatch, e.to_string()))?;
        self.load(catalog);
        Ok(())
    }

    /// Renders the message for a failed filter.
    ///
    /// Falls back to the [`UNDEFINED_MESSAGE`] entry when `filter` has none.
    /// A type-keyed entry without a template for the value's type is a
    /// configuration error.
    pub fn render(
        &self,
        filter: &str,
        value: Option<&Value>,
        attribute: &str,
        args: &[String],
    ) -> Result<String, ValidatorError> {
        let entry = self
            .entries
            .get(filter)
            .or_else(|| self.entries.get(UNDEFINED_MESSAGE));

        let renderer = match entry {
            None => {
                let fallback = Renderer::Template(FALLBACK_TEMPLATE.to_string());
                return Ok(fallback.render(attribute, args));
            }
            Some(MessageEntry::Single(r)) => r,
            Some(MessageEntry::ByType(by_type)) => {
                let value_type = type_name(value);
                by_type
                    .get(value_type)
                    .ok_or_else(|| ValidatorError::NoMessageForType {
                        value_type: value_type.to_string(),
                        filter: filter.to_string(),
                        attribute: attribute.to_string(),
                    })?
            }
        };

        Ok(renderer.render(attribute, args))
    }
}
