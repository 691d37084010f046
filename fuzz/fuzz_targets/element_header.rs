#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: one-shot element header parsing.
//
// A header that parses must write back to no more bytes than it was read
// from, since the writer always picks the shortest size field.
fuzz_target!(|data: &[u8]| {
    let Ok((header, consumed)) = ebml_wire::ElementHeader::read_from(data) else {
        return;
    };
    let mut out = Vec::new();
    if let Ok(written) = header.write_to(&mut out) {
        assert!(written <= consumed);
        assert_eq!(ebml_wire::ElementHeader::read_from(&out).unwrap().0, header);
    }
});
