//! Fuzz target for summary decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostmeta_repo::decode_summary;

fuzz_target!(|data: &[u8]| {
    if let Ok(entries) = decode_summary(data) {
        // A successful decode must re-decode identically.
        let again = decode_summary(data).expect("summary decode is deterministic");
        assert_eq!(entries, again);
    }
});
