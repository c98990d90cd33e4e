//! Fuzz target for the keyfile converter.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostmeta_keyfile::to_json;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(document) = to_json(text) {
            // Whatever parses must serialize.
            let _ = serde_json::to_string(&document).expect("converted document serializes");
        }
    }
});
