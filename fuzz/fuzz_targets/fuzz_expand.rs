#![no_main]

use libfuzzer_sys::fuzz_target;
use rulechain::primitives::resolve_segments;
use rulechain::wildcard::expand_path;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the split point between path and JSON value.
    let split = data[0] as usize % data.len().max(1);
    let (path_bytes, value_bytes) = data.split_at(split.min(data.len()));

    let path = String::from_utf8_lossy(path_bytes);

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) {
        if let Ok(paths) = expand_path(&path, &value) {
            if path.split('.').any(|s| s == "$") {
                for p in &paths {
                    assert!(
                        resolve_segments(&p.segments, &value).is_some() || p.keys.is_empty(),
                        "expanded path {:?} does not resolve",
                        p.path
                    );
                }
            }
        }
    }
});
