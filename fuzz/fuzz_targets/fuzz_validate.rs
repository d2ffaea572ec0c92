#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    schema: String,
    data: String,
}

fuzz_target!(|input: Input| {
    let Ok(mut validator) = rulechain::load(&input.schema) else {
        return;
    };
    let Ok(data) = serde_json::from_str::<serde_json::Value>(&input.data) else {
        return;
    };

    let Ok(first) = validator.validate(&data) else {
        return;
    };
    let second = validator
        .validate(&data)
        .expect("a schema that validated once validates again");
    assert_eq!(first, second, "validation is not idempotent");
    assert_eq!(first.errors.is_none(), first.messages.is_none());
});
