/// Configuration for a [`StreamDecoder`](crate::StreamDecoder).
///
/// ```text
/// ┌──────────────────────────┬──────────────────────────────────────────┐
/// │ Field                    │ Purpose                                  │
/// ├──────────────────────────┼──────────────────────────────────────────┤
/// │ max_depth                │ Optional cap on open elements            │
/// │ max_leaf_size            │ Optional cap on a single leaf's content  │
/// │ initial_depth_capacity   │ Node slots reserved up front             │
/// │ retained_buffer_capacity │ Largest leaf buffer kept for reuse       │
/// │ read_chunk_size          │ Chunk size of the reader adapters        │
/// └──────────────────────────┴──────────────────────────────────────────┘
/// ```
///
/// The limits are off by default: a well-formed stream decodes the same
/// with or without them. They exist for callers feeding untrusted input,
/// where a forged size field would otherwise make the decoder buffer an
/// arbitrarily large leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum number of simultaneously open elements. Opening one more
    /// fails with [`DecodeError::DepthExceeded`](crate::DecodeError::DepthExceeded).
    pub max_depth: Option<usize>,

    /// Maximum declared content size of a leaf. Larger leaves fail with
    /// [`DecodeError::LeafTooLarge`](crate::DecodeError::LeafTooLarge).
    /// Containers are not limited; their content is never buffered.
    pub max_leaf_size: Option<u64>,

    /// Number of node slots allocated when the decoder is created.
    pub initial_depth_capacity: usize,

    /// Leaf buffers whose capacity exceeds this many bytes are released
    /// instead of being kept for the next leaf.
    pub retained_buffer_capacity: usize,

    /// Bytes requested per read by
    /// [`feed_reader`](crate::StreamDecoder::feed_reader) and
    /// [`feed_async_reader`](crate::StreamDecoder::feed_async_reader).
    pub read_chunk_size: usize,
}

impl Default for DecoderConfig {
    /// No limits, 16 node slots, 64 KiB retained per leaf buffer, 8 KiB reads.
    fn default() -> Self {
        Self {
            max_depth: None,
            max_leaf_size: None,
            initial_depth_capacity: 16,
            retained_buffer_capacity: 64 * 1024,
            read_chunk_size: 8 * 1024,
        }
    }
}
