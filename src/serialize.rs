//! [`ValidationResult`] → YAML report.

use crate::error::SerializeError;
use crate::types::ValidationResult;

/// Serialize a validation result to a YAML string.
///
/// Absent maps are emitted as `null`; fields and failed filters keep the
/// order in which they were validated.
pub fn serialize(result: &ValidationResult) -> Result<String, SerializeError> {
    let value = serde_json::to_value(result).map_err(|e| SerializeError {
        message: format!("failed to convert result to JSON value: {}", e),
    })?;

    serde_saphyr::to_string(&value).map_err(|e| SerializeError {
        message: format!("failed to serialize to YAML: {}", e),
    })
}
