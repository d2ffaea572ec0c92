#![no_main]

use libfuzzer_sys::fuzz_target;
use rulechain::Chain;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let chain = Chain::parse(&s);

    // Specs without separators in their parts print back to the same chain.
    let clean = chain.specs().iter().all(|spec| {
        !spec.name.is_empty()
            && !spec.name.contains([':', '|', ','])
            && spec.name.trim() == spec.name
            && spec.args.iter().all(|a| !a.is_empty() && a.trim() == a && !a.contains(['|', ',']))
    });
    if clean {
        assert_eq!(Chain::parse(&chain.to_string()), chain);
    }
});
