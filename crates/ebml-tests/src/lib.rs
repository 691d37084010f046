//! Shared fixtures for the EBML integration tests and benchmarks.
//!
//! The fixture stream mimics a small signal-acquisition file: an EBML
//! header, then a segment with a stream header and a run of sample buffers.
//!
//! ```text
//! EBML
//! ├── EBMLVersion      uinteger
//! └── DocType          string
//! Segment
//! ├── StreamHeader
//! │   ├── ChannelCount uinteger
//! │   ├── SamplingRate uinteger
//! │   └── ChannelName  string      (one per channel)
//! └── Buffer           (repeated)
//!     ├── Timestamp    uinteger
//!     └── Samples      binary(double)
//! ```

use std::fmt::Write as _;

use ebml_decoder::{DecodeError, DecoderEvent, EventCollector, Identifier, StreamDecoder};
use ebml_encoder::EbmlEncoder;

pub mod ids {
    pub const EBML: u64 = 0x1A45_DFA3;
    pub const EBML_VERSION: u64 = 0x4286;
    pub const DOC_TYPE: u64 = 0x4282;
    pub const SEGMENT: u64 = 0x1853_8067;
    pub const STREAM_HEADER: u64 = 0x4A00;
    pub const CHANNEL_COUNT: u64 = 0x4A10;
    pub const SAMPLING_RATE: u64 = 0x4A11;
    pub const CHANNEL_NAME: u64 = 0x4A12;
    pub const BUFFER: u64 = 0x1F43_B675;
    pub const TIMESTAMP: u64 = 0xE7;
    pub const SAMPLES: u64 = 0xA1;
}

pub const CHANNELS: [&str; 2] = ["C3", "C4"];

/// Container identifiers of the fixture stream.
#[must_use]
pub fn containers() -> [Identifier; 4] {
    [
        Identifier(ids::EBML),
        Identifier(ids::SEGMENT),
        Identifier(ids::STREAM_HEADER),
        Identifier(ids::BUFFER),
    ]
}

#[must_use]
pub fn collector() -> EventCollector {
    EventCollector::new(containers())
}

/// Build the fixture stream with `buffers` buffers of `samples` values each.
///
/// Sample `n` (counting across buffers) has the value `n * 0.5`.
#[must_use]
pub fn signal_stream(buffers: usize, samples: usize) -> Vec<u8> {
    let mut encoder = EbmlEncoder::new();
    encoder
        .open_container(ids::EBML)
        .add_unsigned(ids::EBML_VERSION, 1)
        .add_string(ids::DOC_TYPE, "openvibe")
        .close_container();

    encoder
        .open_container(ids::SEGMENT)
        .open_container(ids::STREAM_HEADER)
        .add_unsigned(ids::CHANNEL_COUNT, CHANNELS.len() as u64)
        .add_unsigned(ids::SAMPLING_RATE, 512);
    for name in CHANNELS {
        encoder.add_string(ids::CHANNEL_NAME, name);
    }
    encoder.close_container();

    for buffer in 0..buffers {
        #[allow(clippy::cast_precision_loss)]
        let values: Vec<u8> = (0..samples)
            .flat_map(|s| ((buffer * samples + s) as f64 * 0.5).to_le_bytes())
            .collect();
        encoder
            .open_container(ids::BUFFER)
            .add_unsigned(ids::TIMESTAMP, buffer as u64)
            .add_binary(ids::SAMPLES, &values)
            .close_container();
    }
    encoder.close_container();

    encoder.encode().expect("fixture stream is well formed")
}

/// Decode `bytes` in one call.
///
/// # Errors
///
/// Any error from the decoder, including truncation.
pub fn decode_whole(bytes: &[u8]) -> Result<Vec<DecoderEvent>, DecodeError> {
    let mut decoder = StreamDecoder::new(collector());
    decoder.feed(bytes)?;
    Ok(decoder.finish()?.into_events())
}

/// Decode `bytes` split into chunks of the given sizes. Whatever the sizes
/// leave over is fed as one final chunk. Zero sizes produce empty feeds.
///
/// # Errors
///
/// Any error from the decoder, including truncation.
pub fn decode_split(
    bytes: &[u8],
    sizes: impl IntoIterator<Item = usize>,
) -> Result<Vec<DecoderEvent>, DecodeError> {
    let mut decoder = StreamDecoder::new(collector());
    let mut rest = bytes;
    for size in sizes {
        let (chunk, tail) = rest.split_at(size.min(rest.len()));
        decoder.feed(chunk)?;
        rest = tail;
    }
    decoder.feed(rest)?;
    Ok(decoder.finish()?.into_events())
}

/// Render events as an indented tree, one element per line. Leaf content is
/// shown in hex up to 16 bytes, as a byte count beyond that.
#[must_use]
pub fn render(events: &[DecoderEvent]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut depth = 0usize;
    for event in events {
        match event {
            DecoderEvent::Open(id) => {
                lines.push(format!("{:indent$}{id}", "", indent = depth * 2));
                depth += 1;
            }
            DecoderEvent::Data(bytes) => {
                if let Some(line) = lines.last_mut() {
                    if bytes.len() <= 16 {
                        let _ = write!(line, ": {}", hex::encode(bytes));
                    } else {
                        let _ = write!(line, ": <{} bytes>", bytes.len());
                    }
                }
            }
            DecoderEvent::Close => depth = depth.saturating_sub(1),
        }
    }
    lines.join("\n")
}
