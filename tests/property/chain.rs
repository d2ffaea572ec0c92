use proptest::prelude::*;
use rulechain::filters::FilterRegistry;
use rulechain::messages::MessageRegistry;
use rulechain::pipeline::run_chain;
use rulechain::{Chain, FilterSpec};
use serde_json::{Value, json};

/// Built-in filters other than `required`, with arguments they accept.
fn arb_optional_spec() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("string".to_string()),
        Just("email".to_string()),
        Just("numeric".to_string()),
        Just("alpha".to_string()),
        (0u8..20).prop_map(|n| format!("min:{}", n)),
        (0u8..20).prop_map(|n| format!("max:{}", n)),
        (0u8..5, 5u8..20).prop_map(|(a, b)| format!("between:{},{}", a, b)),
        "[a-z]{1,3}(,[a-z]{1,3}){0,3}".prop_map(|list| format!("in:{}", list)),
    ]
}

fn arb_chain() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_optional_spec(), 0..6)
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9@. ]{0,24}".prop_map(Value::String),
        any::<i32>().prop_map(|i| json!(i)),
        prop::collection::vec(any::<u8>().prop_map(|b| json!(b)), 0..8).prop_map(Value::Array),
    ]
}

fn failures(tokens: &[String], value: Option<&Value>) -> Vec<String> {
    let outcome = run_chain(
        &Chain::from_tokens(tokens),
        value,
        "field",
        &FilterRegistry::with_builtins(),
        &MessageRegistry::english(),
    )
    .unwrap();
    assert_messages_cover(&outcome.failed, &outcome.messages);
    outcome.failed.keys().cloned().collect()
}

fn assert_messages_cover(
    failed: &indexmap::IndexMap<String, bool>,
    messages: &indexmap::IndexMap<String, String>,
) {
    assert_eq!(
        failed.keys().collect::<Vec<_>>(),
        messages.keys().collect::<Vec<_>>(),
        "every failure carries a message"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Absent and empty values skip every filter except `required`.
    #[test]
    fn blank_values_only_fail_required(tokens in arb_chain(), with_required in any::<bool>()) {
        let mut tokens = tokens;
        if with_required {
            tokens.insert(0, "required".to_string());
        }
        let expected: Vec<String> = if with_required { vec!["required".into()] } else { vec![] };

        prop_assert_eq!(failures(&tokens, None), expected.clone());
        prop_assert_eq!(failures(&tokens, Some(&json!(""))), expected);
    }

    // Failures keep chain order and never name a filter outside the chain.
    #[test]
    fn failures_follow_chain_order(tokens in arb_chain(), value in arb_value()) {
        let chain = Chain::from_tokens(&tokens);
        let names: Vec<&str> = chain.specs().iter().map(|s| s.name.as_str()).collect();
        let failed = failures(&tokens, Some(&value));

        let mut cursor = 0;
        for name in &failed {
            let pos = names[cursor..].iter().position(|n| n == name);
            prop_assert!(pos.is_some(), "{} out of order in {:?}", name, names);
            cursor += pos.unwrap_or(0) + 1;
        }
    }

    // A chain printed with Display parses back to the same specs.
    #[test]
    fn display_parses_back(
        specs in prop::collection::vec(
            ("[a-z_]{1,8}", prop::collection::vec("[a-z0-9]{1,4}", 0..3)),
            0..5,
        )
    ) {
        let chain: Chain = specs
            .into_iter()
            .map(|(name, args)| FilterSpec::new(name, args))
            .collect();
        prop_assert_eq!(Chain::parse(&chain.to_string()), chain);
    }
}
