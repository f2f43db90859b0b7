//! Replaying arbitrary patches must fail cleanly, never panic.
//!
//! Input is a JSON object `{"doc": ..., "patch": [...]}`.
//!
//! Run with: cargo +nightly fuzz run apply_fuzz -- -max_total_time=60

#![no_main]

use holocron_core::{apply_patch, Patch};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Object(mut input)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let (Some(mut doc), Some(patch)) = (input.remove("doc"), input.remove("patch")) else {
        return;
    };
    let Ok(patch) = serde_json::from_value::<Patch>(patch) else {
        return;
    };

    let _ = apply_patch(&mut doc, &patch);
});
