use super::common::{load_cases, values_structurally_equal};
use serde_json::Value;

#[derive(Debug, serde::Deserialize)]
struct ValidateCase {
    id: String,
    name: String,
    schema: String,
    data: Value,
    errors: Value,
    messages: Value,
}

#[test]
fn validate_suite() {
    let cases: Vec<ValidateCase> = load_cases("validate.yaml");
    assert!(!cases.is_empty(), "validate.yaml has no cases");

    let mut failed = Vec::new();

    for case in &cases {
        let mut validator = match rulechain::load(&case.schema) {
            Ok(v) => v,
            Err(e) => {
                failed.push(format!("[{}] {}: schema failed to load: {}", case.id, case.name, e));
                continue;
            }
        };
        let result = match validator.validate(&case.data) {
            Ok(r) => r,
            Err(e) => {
                failed.push(format!("[{}] {}: validate failed: {}", case.id, case.name, e));
                continue;
            }
        };

        let errors = serde_json::to_value(&result.errors).unwrap();
        let messages = serde_json::to_value(&result.messages).unwrap();

        if !values_structurally_equal(&errors, &case.errors) {
            failed.push(format!(
                "[{}] {}: errors expected {}, got {}",
                case.id, case.name, case.errors, errors
            ));
        }
        if !values_structurally_equal(&messages, &case.messages) {
            failed.push(format!(
                "[{}] {}: messages expected {}, got {}",
                case.id, case.name, case.messages, messages
            ));
        }
        if validator.is_valid() != case.errors.is_null() {
            failed.push(format!(
                "[{}] {}: is_valid() disagrees with expected errors",
                case.id, case.name
            ));
        }
    }

    assert!(
        failed.is_empty(),
        "{} of {} validate cases failed:\n{}",
        failed.len(),
        cases.len(),
        failed.join("\n")
    );
}
