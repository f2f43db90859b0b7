//! Diff/replay round trip over arbitrary JSON document pairs.
//!
//! Run with: cargo +nightly fuzz run patch_fuzz -- -max_total_time=60

#![no_main]

use holocron_core::{apply_patch, diff};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Split the input into two documents at the first NUL byte.
    let Some(split) = data.iter().position(|b| *b == 0) else {
        return;
    };
    let (Ok(original), Ok(new)) = (
        serde_json::from_slice::<Value>(&data[..split]),
        serde_json::from_slice::<Value>(&data[split + 1..]),
    ) else {
        return;
    };

    let patch = diff(&original, &new);
    let mut doc = original.clone();
    apply_patch(&mut doc, &patch).expect("diff output must replay cleanly");
    assert_eq!(doc, new, "replayed document differs from target");

    if original == new {
        assert!(patch.is_empty(), "equal documents must not produce ops");
    }
});
