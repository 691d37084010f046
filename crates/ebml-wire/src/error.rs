/// Errors raised by the wire-level codecs.
///
/// The streaming decoder never sees `UnexpectedEof`: it waits for more
/// bytes instead. These variants surface from the one-shot helpers
/// (`decode_raw`, `ElementHeader::read_from`) and from the encoding side.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete variable-length integer could be read.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A forced encoding length outside 1..=10 was requested.
    #[error("invalid vint length {length}, expected 1..=10")]
    InvalidLength { length: usize },

    /// The value does not fit in the requested encoding length.
    #[error("value {value} does not fit in a {length}-byte vint")]
    ValueTooLarge { value: u64, length: usize },

    /// The identifier's significant bytes do not carry a matching length marker.
    #[error("identifier {id:#X} does not encode its own length")]
    InvalidIdentifier { id: u64 },

    /// I/O error during write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
