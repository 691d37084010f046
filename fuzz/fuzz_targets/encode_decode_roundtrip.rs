#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use ebml_decoder::{DecoderEvent, EventCollector, Identifier, StreamDecoder};
use ebml_encoder::EbmlEncoder;
use libfuzzer_sys::fuzz_target;

const CONTAINER: u64 = 0x1F43_B675;
const LEAF_IDS: [u64; 4] = [0x81, 0x4286, 0x2A_D7B1, 0x1A45_0001];

#[derive(Debug, Arbitrary)]
enum FuzzNode {
    Leaf { id_choice: u8, content: Vec<u8> },
    Unsigned { id_choice: u8, value: u64 },
    Container(Vec<FuzzNode>),
}

fn leaf_id(choice: u8) -> u64 {
    LEAF_IDS[usize::from(choice) % LEAF_IDS.len()]
}

fn encode(node: &FuzzNode, encoder: &mut EbmlEncoder, expected: &mut Vec<DecoderEvent>) {
    match node {
        FuzzNode::Leaf { id_choice, content } => {
            encoder.add_binary(leaf_id(*id_choice), content);
            expected.push(DecoderEvent::Open(Identifier(leaf_id(*id_choice))));
            expected.push(DecoderEvent::Data(content.clone()));
        }
        FuzzNode::Unsigned { id_choice, value } => {
            encoder.add_unsigned(leaf_id(*id_choice), *value);
            expected.push(DecoderEvent::Open(Identifier(leaf_id(*id_choice))));
            expected.push(DecoderEvent::Data(ebml_wire::value::write_unsigned(*value)));
        }
        FuzzNode::Container(children) => {
            encoder.open_container(CONTAINER);
            expected.push(DecoderEvent::Open(Identifier(CONTAINER)));
            for child in children {
                encode(child, encoder, expected);
            }
            encoder.close_container();
        }
    }
    expected.push(DecoderEvent::Close);
}

// Fuzz target: EbmlEncoder -> StreamDecoder roundtrip.
//
// Builds an element tree through the encoder, then decodes it byte by byte.
// The decoder must accept everything the encoder produces and report the
// tree exactly as it was built.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(nodes) = Vec::<FuzzNode>::arbitrary(&mut u) else {
        return;
    };
    if nodes.is_empty() {
        return;
    }

    let mut encoder = EbmlEncoder::new();
    let mut expected = Vec::new();
    for node in &nodes {
        encode(node, &mut encoder, &mut expected);
    }
    let Ok(bytes) = encoder.encode() else {
        return;
    };

    let mut decoder = StreamDecoder::new(EventCollector::new([Identifier(CONTAINER)]));
    for byte in &bytes {
        decoder
            .feed(std::slice::from_ref(byte))
            .expect("decoder failed on valid encoder output");
    }
    let events = decoder
        .finish()
        .expect("encoder output ended inside an element")
        .into_events();
    assert_eq!(events, expected);
});
