#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: size vint encode->decode roundtrip.
//
// Takes 8 bytes of fuzz input, interprets them as a u64, encodes the value
// as a size, then decodes it and asserts the value matches.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let value = u64::from_le_bytes(data[..8].try_into().unwrap());

    let mut buf = [0u8; ebml_wire::vint::MAX_VINT_BYTES];
    let encoded_len = ebml_wire::vint::encode_size(value, &mut buf);
    assert_eq!(encoded_len, ebml_wire::vint::size_length(value));

    let (decoded, decoded_len) = ebml_wire::vint::decode_masked(&buf[..encoded_len]).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded_len, encoded_len);
});
