//! Fuzz target for the binary container decoder.
//!
//! Tests that arbitrary bytes never panic the decoder or read out of
//! bounds, for both byte orders and a spread of real document signatures.

#![no_main]

use libfuzzer_sys::fuzz_target;
use ostmeta_variant::{decode, Endian, Type};

fuzz_target!(|data: &[u8]| {
    // First byte picks a signature, the rest is the document.
    let Some((&selector, document)) = data.split_first() else {
        return;
    };

    let signatures = [
        "y",
        "t",
        "s",
        "ay",
        "as",
        "a{sv}",
        "v",
        "(yt)",
        "(a(s(ayv))a{sv})",
        "(a{sv}aya(say)sstayay)",
        "(a(say)a(sayay))",
        "(uuua(ayay))",
    ];
    let signature = signatures[selector as usize % signatures.len()];

    for endian in [Endian::Little, Endian::Big] {
        let _ = decode(document, endian, signature);
    }

    // Signature parsing itself must also be total.
    if let Ok(text) = std::str::from_utf8(document) {
        let _ = Type::parse(text);
    }
});
