use proptest::prelude::*;
use rulechain::primitives::values_deep_equal;
use rulechain::tracker::FieldTracker;
use rulechain::{Registry, Validator, ValidatorOptions};
use serde_json::{Value, json};
use std::sync::Arc;

fn arb_field_value() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!(""))),
        "[a-c]{1,2}".prop_map(|s| Some(Value::String(s))),
        (0i64..3).prop_map(|n| Some(json!(n))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Dirty iff some touch changed the value, starting from "".
    #[test]
    fn dirty_matches_a_change_model(values in prop::collection::vec(arb_field_value(), 1..8)) {
        let mut tracker = FieldTracker::new();
        let mut previous = json!("");
        let mut changed = false;

        for value in &values {
            let current = value.clone().unwrap_or_else(|| json!(""));
            changed |= !values_deep_equal(&previous, &current);

            let state = tracker.touch("f", value.as_ref());
            prop_assert_eq!(&state.old_value, &previous);
            prop_assert_eq!(&state.value, &current);
            prop_assert_eq!(state.dirty, changed);
            previous = current;
        }
        prop_assert_eq!(tracker.is_dirty(), changed);
    }

    // Validating the same data twice gives the same result and flags.
    #[test]
    fn validate_is_idempotent(
        a in arb_field_value(),
        b in arb_field_value(),
    ) {
        let mut data = serde_json::Map::new();
        if let Some(a) = a {
            data.insert("a".into(), a);
        }
        if let Some(b) = b {
            data.insert("b".into(), b);
        }
        let data = Value::Object(data);

        let mut v = Validator::new(
            Arc::new(Registry::with_defaults()),
            ValidatorOptions::new()
                .rule("a", "required|string")
                .rule("b", "numeric|max:1"),
        )
        .unwrap();

        let first = v.validate(&data).unwrap();
        let flags = (v.field("a").cloned(), v.field("b").cloned(), v.is_empty());
        let second = v.validate(&data).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(v.field("a").map(|s| s.dirty), flags.0.map(|s| s.dirty));
        prop_assert_eq!(v.field("b").map(|s| s.dirty), flags.1.map(|s| s.dirty));
        prop_assert_eq!(v.is_empty(), flags.2);
    }
}
