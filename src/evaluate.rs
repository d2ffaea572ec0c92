//! Expression evaluation for preset gates.

use crate::error::*;
use crate::primitives::is_truthy;
use serde_json::Value;
#[cfg(feature = "cel-eval")]
use std::collections::HashMap;

/// Extension point for evaluating gate expressions against the input data.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluates `expression` with each key of `context` bound as a variable.
    fn evaluate(&self, expression: &str, context: &Value) -> Result<Value, EvaluationError>;
}

/// Evaluates a gate expression with `data` bound to the input and reduces
/// the result to a truthiness decision.
pub fn evaluate_gate(
    evaluator: &dyn ExpressionEvaluator,
    expression: &str,
    data: &Value,
) -> Result<bool, EvaluationError> {
    let mut context = serde_json::Map::new();
    context.insert("data".to_string(), data.clone());
    let result = evaluator.evaluate(expression, &Value::Object(context))?;
    Ok(is_truthy(&result))
}

// ─── Default CEL Evaluator (behind `cel-eval` feature) ──────────────────────

/// Default evaluator backed by the `cel` crate.
///
/// Missing fields and undeclared references evaluate to `false`, so a gate
/// such as `data.country == "FR"` simply stays closed when `country` is
/// absent.
#[cfg(feature = "cel-eval")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCelEvaluator;

#[cfg(feature = "cel-eval")]
impl ExpressionEvaluator for DefaultCelEvaluator {
    fn evaluate(&self, expression: &str, context: &Value) -> Result<Value, EvaluationError> {
        let program = cel::Program::compile(expression).map_err(|e| EvaluationError {
            kind: EvaluationErrorKind::Compile,
            message: format!("CEL compile error: {}", e),
        })?;

        let mut cel_ctx = cel::Context::default();
        if let Value::Object(map) = context {
            for (key, value) in map {
                cel_ctx.add_variable_from_value(key.as_str(), json_to_cel(value));
            }
        }

        match program.execute(&cel_ctx) {
            Ok(result) => Ok(cel_to_json(&result)),
            Err(cel::ExecutionError::NoSuchKey(_)) => Ok(Value::Bool(false)),
            Err(cel::ExecutionError::UndeclaredReference(_)) => Ok(Value::Bool(false)),
            Err(e) => Err(EvaluationError {
                kind: EvaluationErrorKind::Execution,
                message: format!("CEL execution error: {}", e),
            }),
        }
    }
}

#[cfg(feature = "cel-eval")]
fn json_to_cel(value: &Value) -> cel::Value {
    use std::sync::Arc;

    match value {
        Value::Null => cel::Value::Null,
        Value::Bool(b) => cel::Value::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map(cel::Value::Int)
            .or_else(|| n.as_u64().map(cel::Value::UInt))
            .or_else(|| n.as_f64().map(cel::Value::Float))
            .unwrap_or(cel::Value::Null),
        Value::String(s) => cel::Value::String(Arc::new(s.clone())),
        Value::Array(arr) => cel::Value::List(Arc::new(arr.iter().map(json_to_cel).collect())),
        Value::Object(map) => {
            let entries: HashMap<String, cel::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_cel(v)))
                .collect();
            entries.into()
        }
    }
}

/// Only scalars and lists matter for gate decisions; maps collapse to
/// `true`, anything else to `null`.
#[cfg(feature = "cel-eval")]
fn cel_to_json(value: &cel::Value) -> Value {
    match value {
        cel::Value::Null => Value::Null,
        cel::Value::Bool(b) => Value::Bool(*b),
        cel::Value::Int(i) => Value::Number((*i).into()),
        cel::Value::UInt(u) => Value::Number((*u).into()),
        cel::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        cel::Value::String(s) => Value::String(s.to_string()),
        cel::Value::List(l) => Value::Array(l.iter().map(cel_to_json).collect()),
        cel::Value::Map(_) => Value::Bool(true),
        _ => Value::Null,
    }
}
