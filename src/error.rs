use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error kind for schema parse failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownField,
}

/// Produced by `parse` when a YAML schema cannot be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            path: None,
            line: None,
            column: None,
        }
    }

    pub(crate) fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column, &self.path) {
            (Some(line), Some(col), _) => write!(f, "{}:{}: {}", line, col, self.message),
            (_, _, Some(path)) => write!(f, "{}: {}", path, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Error kind for gate expression failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationErrorKind {
    Compile,
    Execution,
    Unavailable,
}

/// Produced by an [`ExpressionEvaluator`](crate::evaluate::ExpressionEvaluator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationError {
    pub kind: EvaluationErrorKind,
    pub message: String,
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvaluationError {}

/// Serialization error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializeError {
    pub message: String,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SerializeError {}

/// Configuration errors raised by registration and validation calls.
///
/// Every variant points at a mistake in the validation schema, never at the
/// data being validated. Failing filters are reported through
/// [`ValidationResult`](crate::ValidationResult) instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidatorError {
    #[error("filter \"{0}\" is not registered")]
    UnknownFilter(String),

    #[error("preset named \"{0}\" is not defined")]
    UnknownPreset(String),

    #[error("overriding preset \"{0}\"")]
    DuplicatePreset(String),

    #[error("rule at \"{0}\" is neither a filter chain nor a conditional rule")]
    InvalidRuleType(String),

    #[error("wildcard prefix \"{0}\" was not found in the data")]
    PathNotFound(String),

    #[error("no \"{filter}\" message for values of type \"{value_type}\" (field \"{attribute}\")")]
    NoMessageForType {
        value_type: String,
        filter: String,
        attribute: String,
    },

    #[error("wildcard path \"{0}\" has too many markers")]
    WildcardDepthExceeded(String),

    #[error("gate expression for preset \"{preset}\" failed: {message}")]
    GateExpression { preset: String, message: String },

    #[error("schema parse error: {0}")]
    Parse(#[from] ParseError),
}
