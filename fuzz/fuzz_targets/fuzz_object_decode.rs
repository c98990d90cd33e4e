//! Fuzz target for commit, dirtree, and dirmeta object decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostmeta_repo::{decode_commit, decode_dirmeta, decode_dirtree, Checksum};

fuzz_target!(|data: &[u8]| {
    let checksum = Checksum::digest(data);
    let _ = decode_commit(&checksum, data);
    let _ = decode_dirtree(&checksum, data);
    let _ = decode_dirmeta(&checksum, data);
});
