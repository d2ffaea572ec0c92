use super::common::load_cases;
use rulechain::ValidatorError;
use rulechain::wildcard::expand_path;
use serde_json::Value;

#[derive(Debug, serde::Deserialize)]
struct ExpandCase {
    id: String,
    name: String,
    path: String,
    data: Value,
    #[serde(default)]
    expected: Option<Vec<String>>,
    #[serde(default)]
    missing: Option<String>,
}

#[test]
fn expand_suite() {
    let cases: Vec<ExpandCase> = load_cases("expand.yaml");
    assert!(!cases.is_empty(), "expand.yaml has no cases");

    let mut failed = Vec::new();

    for case in &cases {
        let result = expand_path(&case.path, &case.data);
        let ok = match (&case.expected, &case.missing, &result) {
            (Some(expected), None, Ok(paths)) => {
                let got: Vec<&str> = paths.iter().map(|p| p.path.as_str()).collect();
                got == expected.iter().map(String::as_str).collect::<Vec<_>>()
            }
            (None, Some(prefix), Err(ValidatorError::PathNotFound(got))) => got == prefix,
            _ => false,
        };
        if !ok {
            failed.push(format!(
                "[{}] {}: expected {:?} / missing {:?}, got {:?}",
                case.id, case.name, case.expected, case.missing, result
            ));
        }
    }

    assert!(
        failed.is_empty(),
        "{} of {} expand cases failed:\n{}",
        failed.len(),
        cases.len(),
        failed.join("\n")
    );
}
