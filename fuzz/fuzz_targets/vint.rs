#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: vint decoding.
//
// Catches bugs in:
// - Zero first byte (9- and 10-byte lengths need a second byte)
// - Inputs shorter than the announced length
// - Values wider than 64 bits
fuzz_target!(|data: &[u8]| {
    let length = ebml_wire::vint::encoded_length(data);
    match ebml_wire::vint::decode_raw(data) {
        Ok((_, consumed)) => assert_eq!(Some(consumed), length),
        Err(_) => assert!(length.map_or(true, |l| l > data.len())),
    }
    let _ = ebml_wire::vint::decode_masked(data);
});
