use rulechain::error::ParseErrorKind;
use rulechain::helpers::ChainBuilder;
use rulechain::*;
use serde_json::json;

fn parse_kind(input: &str) -> Option<ParseErrorKind> {
    match parse(input) {
        Err(ValidatorError::Parse(e)) => Some(e.kind),
        _ => None,
    }
}

// ─── Schema shape ────────────────────────────────────────────────────────────

#[test]
fn empty_input_is_rejected() {
    assert_eq!(parse_kind(""), Some(ParseErrorKind::Syntax));
    assert_eq!(parse_kind("   \n"), Some(ParseErrorKind::Syntax));
}

#[test]
fn root_must_be_a_mapping() {
    assert_eq!(parse_kind("- a\n- b\n"), Some(ParseErrorKind::TypeMismatch));
}

#[test]
fn unknown_top_level_field_is_rejected() {
    match parse("rules: {}\nfilters: {}\n") {
        Err(ValidatorError::Parse(e)) => {
            assert_eq!(e.kind, ParseErrorKind::UnknownField);
            assert_eq!(e.path.as_deref(), Some("filters"));
        }
        other => panic!("expected UnknownField, got {:?}", other),
    }
}

#[test]
fn non_chain_rule_is_an_invalid_rule_type() {
    let err = parse("rules:\n  age: 42\n").unwrap_err();
    assert_eq!(err, ValidatorError::InvalidRuleType("age".to_string()));

    let err = parse("rules:\n  age: {min: 3}\n").unwrap_err();
    assert_eq!(err, ValidatorError::InvalidRuleType("age".to_string()));
}

#[test]
fn replace_labels_must_be_strings() {
    assert_eq!(
        parse_kind("replaces:\n  name: [a]\n"),
        Some(ParseErrorKind::TypeMismatch)
    );
}

// ─── Rule shapes ─────────────────────────────────────────────────────────────

#[test]
fn rules_accept_strings_token_lists_and_structured_specs() {
    let schema = parse(
        r#"
rules:
  a: "required|min:4"
  b: [required, "between:1,3"]
  c:
    - name: in
      args: [1, two, true]
"#,
    )
    .unwrap();

    assert_eq!(schema.rules["a"], Rule::from("required|min:4"));
    assert_eq!(schema.rules["b"], Rule::from("required|between:1,3"));
    assert_eq!(
        schema.rules["c"],
        Rule::Chain(Chain::from(vec![FilterSpec::new(
            "in",
            vec!["1".into(), "two".into(), "true".into()]
        )]))
    );
}

#[test]
fn rule_order_follows_the_document() {
    let schema = parse("rules:\n  z: required\n  a: required\n  m: required\n").unwrap();
    let keys: Vec<&str> = schema.rules.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

// ─── Presets and messages ────────────────────────────────────────────────────

#[test]
fn use_presets_list_and_map_forms() {
    let list = parse("use_presets: [address, contact]\n").unwrap();
    match list.use_presets {
        PresetSelection::List(names) => assert_eq!(names, vec!["address", "contact"]),
        other => panic!("expected list selection, got {:?}", other),
    }

    let map = parse(
        "use_presets:\n  address: true\n  contact: false\n  company: \"data.kind == 'company'\"\n",
    )
    .unwrap();
    let PresetSelection::Gated(gates) = map.use_presets else {
        panic!("expected gated selection");
    };
    assert!(matches!(gates["address"], PresetGate::Always));
    assert!(matches!(gates["contact"], PresetGate::Never));
    assert!(
        matches!(&gates["company"], PresetGate::Expression(e) if e == "data.kind == 'company'")
    );
}

#[test]
fn preset_bodies_are_parsed() {
    let schema = parse(
        r#"
presets:
  address:
    rules:
      address.city: required
    replaces:
      address.city: city
"#,
    )
    .unwrap();
    assert_eq!(
        schema.presets["address"],
        Preset::new()
            .rule("address.city", "required")
            .replace("address.city", "city")
    );
}

#[test]
fn unknown_preset_field_is_rejected() {
    assert_eq!(
        parse_kind("presets:\n  address:\n    gate: true\n"),
        Some(ParseErrorKind::UnknownField)
    );
}

#[test]
fn load_registers_presets_and_messages() {
    let mut v = load(
        r#"
rules:
  name: required
presets:
  address:
    rules:
      city: required
use_presets: [address]
messages:
  required: "{attribute} cannot be left blank"
"#,
    )
    .unwrap();

    let result = v.validate(&json!({})).unwrap();
    assert_eq!(result.message("name", "required"), Some("name cannot be left blank"));
    assert_eq!(result.message("city", "required"), Some("city cannot be left blank"));
    assert!(v.preset("address").is_ok());
}

#[test]
fn load_rejects_unknown_list_presets() {
    assert_eq!(
        load("use_presets: [ghost]\n").unwrap_err(),
        ValidatorError::UnknownPreset("ghost".to_string())
    );
}

#[test]
fn load_schema_rejects_presets_already_registered() {
    let mut registry = Registry::with_defaults();
    registry.set_preset("address", Preset::new()).unwrap();
    let schema = parse("presets:\n  address:\n    rules:\n      city: required\n").unwrap();
    assert_eq!(
        load_schema(registry, schema).unwrap_err(),
        ValidatorError::DuplicatePreset("address".to_string())
    );
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[test]
fn serialized_report_reads_back() {
    let mut v = load("rules:\n  name: \"required|min:4\"\n  age: numeric\n").unwrap();
    let result = v.validate(&json!({"name": "usr", "age": "x"})).unwrap();

    let yaml = serialize(&result).unwrap();
    let back: ValidationResult = serde_saphyr::from_str(&yaml).unwrap();
    assert_eq!(back, result);
}

#[test]
fn valid_report_has_null_maps() {
    let yaml = serialize(&ValidationResult::default()).unwrap();
    let back: serde_json::Value = serde_saphyr::from_str(&yaml).unwrap();
    assert_eq!(back, json!({"errors": null, "messages": null}));
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

#[test]
fn chain_builder_skips_disabled_specs() {
    let builder = ChainBuilder::new()
        .push("required")
        .extend_if([("email", true), ("min:8", false), ("max:64", true)]);
    assert_eq!(builder.build(), "required|email|max:64");
    assert_eq!(builder.into_chain(), Chain::parse("required|email|max:64"));
}

#[test]
fn chain_builder_output_is_a_valid_rule() {
    let chain = ChainBuilder::new().push_if(true, "required").push("min:2").build();
    let mut v = validator_with(&chain);
    assert_eq!(v.validate(&json!({"f": "a"})).unwrap().failed_filters("f"), vec!["min"]);
}

fn validator_with(chain: &str) -> Validator {
    Validator::new(
        std::sync::Arc::new(Registry::with_defaults()),
        ValidatorOptions::new().rule("f", chain),
    )
    .unwrap()
}
