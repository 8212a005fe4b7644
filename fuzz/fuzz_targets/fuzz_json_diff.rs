#![no_main]

use libfuzzer_sys::fuzz_target;
use verity_compare::{deep_diff, deep_equal, Policy};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };
    // Every parsed document equals itself and diffs empty against itself;
    // JSON cannot encode NaN, so reflexivity has no exceptions here.
    let policy = Policy::new();
    assert_eq!(deep_equal(&doc, &doc, &policy).ok(), Some(true));
    assert_eq!(deep_diff(&doc, &doc, &policy).ok().as_deref(), Some(""));
});
