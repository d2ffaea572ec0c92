//! Schema-driven validation of dynamic records.
//!
//! A [`Validator`] checks a `serde_json::Value` against a table of
//! per-field rule chains such as `"required|min:4"`. Rule paths may contain
//! `$` segments that expand to every key found at that position in the data,
//! so fields nested in arrays or maps of unknown size are validated too.
//! Reusable [presets](Preset) can be merged in per run, unconditionally or
//! gated on the data, and every field's dirty state is tracked across runs.
//!
//! ```text
//! compose(rules, presets, data) → expand($ paths, data) → run chains → ValidationResult
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//!
//! let yaml = r#"
//! rules:
//!   name: "required|min:4"
//!   users.$.email: "required|email"
//! replaces:
//!   users.$.email: "user email"
//! "#;
//!
//! let mut validator = rulechain::load(yaml).expect("valid schema");
//! let result = validator
//!     .validate(&json!({
//!         "name": "usr",
//!         "users": [{ "email": "a@example.com" }, { "email": "nope" }]
//!     }))
//!     .expect("no configuration error");
//!
//! assert_eq!(result.failed_filters("name"), vec!["min"]);
//! assert_eq!(
//!     result.message("users.1.email", "email"),
//!     Some("The field user email must be an valid email address")
//! );
//! ```
//!
//! # Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cel-eval` | yes     | CEL preset gates via the [`cel`] crate. Enables [`evaluate::DefaultCelEvaluator`]. |

pub mod error;
pub mod evaluate;
pub mod filters;
pub mod helpers;
pub mod messages;
pub mod parse;
pub mod pipeline;
pub mod presets;
pub mod primitives;
pub mod registry;
pub mod serialize;
pub mod tracker;
pub mod types;
pub mod validator;
pub mod wildcard;

pub use error::*;
pub use types::*;

pub use messages::{MessageEntry, Renderer};
pub use parse::{Schema, parse};
pub use registry::Registry;
pub use serialize::serialize;
pub use tracker::FieldState;
pub use validator::{Validator, ValidatorOptions};

use std::sync::Arc;

/// Convenience entry point: parse a YAML schema and build a validator on a
/// registry holding the built-in filters, the English catalog, the schema's
/// own messages and its presets.
///
/// # Errors
///
/// Returns the parse error, a duplicate preset name, or an unknown preset
/// named in a `use_presets` list.
pub fn load(input: &str) -> Result<Validator, ValidatorError> {
    let schema = parse::parse(input)?;
    load_schema(Registry::with_defaults(), schema)
}

/// Registers a parsed schema's messages and presets on `registry` and builds
/// a validator from its rules.
pub fn load_schema(mut registry: Registry, schema: Schema) -> Result<Validator, ValidatorError> {
    registry.load_messages(schema.messages);
    for (name, preset) in schema.presets {
        registry.set_preset(name, preset)?;
    }

    let options = ValidatorOptions {
        rules: schema.rules,
        replaces: schema.replaces,
        presets: schema.use_presets,
    };
    Validator::new(Arc::new(registry), options)
}
