#![no_main]

use ebml_decoder::{DecoderConfig, EventCollector, Identifier, StreamDecoder};
use libfuzzer_sys::fuzz_target;

const CONTAINERS: [u64; 4] = [0x1A45_DFA3, 0x1853_8067, 0x1F43_B675, 0x81];

fn decoder() -> StreamDecoder<EventCollector> {
    let config = DecoderConfig {
        max_depth: Some(64),
        max_leaf_size: Some(1 << 20),
        ..DecoderConfig::default()
    };
    StreamDecoder::with_config(EventCollector::new(CONTAINERS.map(Identifier)), config)
}

// Fuzz target: streaming decoder on arbitrary bytes.
//
// The first byte picks a chunk size; the rest is fed once whole and once in
// chunks. Both runs must report the same events and fail (or not) alike.
// Catches bugs in:
// - Header bytes split across feeds (pending buffer)
// - Leaf content split across feeds (spare buffer)
// - Closing cascades after a zero-size element
// - Overrun and limit checks
fuzz_target!(|data: &[u8]| {
    let Some((&first, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(first % 17) + 1;

    let mut whole = decoder();
    let whole_result = whole.feed(stream).and_then(|()| whole.check_complete());

    let mut split = decoder();
    let split_result = stream
        .chunks(chunk)
        .try_for_each(|piece| split.feed(piece))
        .and_then(|()| split.check_complete());

    assert_eq!(whole_result.is_ok(), split_result.is_ok());
    assert_eq!(whole.callback().events(), split.callback().events());
});
