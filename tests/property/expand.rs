use proptest::prelude::*;
use rulechain::primitives::resolve_segments;
use rulechain::wildcard::expand_path;
use rulechain::{PathKey, ValidatorError};
use serde_json::{Value, json};

/// Strategy for arbitrary JSON values nested up to `depth` levels.
fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        "[a-z]{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z][a-z0-9]{0,5}", inner), 0..5).prop_map(|pairs| {
                let map: serde_json::Map<String, Value> = pairs.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // One concrete path per array element, in index order.
    #[test]
    fn array_marker_yields_one_path_per_element(items in prop::collection::vec(arb_json(2), 0..10)) {
        let n = items.len();
        let data = json!({ "items": items });
        let paths = expand_path("items.$", &data).unwrap();

        prop_assert_eq!(paths.len(), n);
        for (i, p) in paths.iter().enumerate() {
            prop_assert_eq!(&p.path, &format!("items.{}", i));
            prop_assert_eq!(&p.keys, &vec![PathKey::Index(i)]);
            prop_assert!(resolve_segments(&p.segments, &data).is_some());
        }
    }

    // Map markers follow the map's own key order.
    #[test]
    fn map_marker_follows_key_order(data in arb_json(3)) {
        let Value::Object(map) = &data else {
            return Ok(());
        };
        let root = json!({ "m": data.clone() });
        let paths = expand_path("m.$", &root).unwrap();
        let got: Vec<&str> = paths.iter().map(|p| p.segments[1].as_str()).collect();
        let expected: Vec<&str> = map.keys().map(String::as_str).collect();
        prop_assert_eq!(got, expected);
    }

    // Expanded paths never keep a marker and always resolve.
    #[test]
    fn nested_markers_fully_resolve(data in arb_json(4)) {
        let root = json!({ "d": data });
        for pattern in ["d.$", "d.$.$", "d.$.$.$"] {
            match expand_path(pattern, &root) {
                Ok(paths) => {
                    for p in paths {
                        prop_assert!(!p.segments.iter().any(|s| s == "$"),
                            "{} left a marker in {}", pattern, p.path);
                        prop_assert_eq!(p.keys.len(), pattern.matches('$').count());
                        prop_assert!(resolve_segments(&p.segments, &root).is_some(),
                            "{} does not resolve", p.path);
                    }
                }
                Err(ValidatorError::PathNotFound(_)) => {}
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }
    }

    // Plain paths are returned unchanged whatever the data holds.
    #[test]
    fn plain_path_is_identity(data in arb_json(2), path in "[a-z]{1,4}(\\.[a-z0-9]{1,4}){0,3}") {
        let paths = expand_path(&path, &data).unwrap();
        prop_assert_eq!(paths.len(), 1);
        prop_assert_eq!(&paths[0].path, &path);
        prop_assert!(paths[0].keys.is_empty());
    }
}
