use ebml_wire::{Identifier, WireError};

/// Errors that can occur while decoding an EBML stream.
///
/// Running out of input is not among them: `feed` simply waits for the
/// next call. Truncation is only reported when the caller declares the
/// stream finished.
///
/// ```text
///   DecodeError
///   ├── Truncated         ← finish() with open elements or a partial field
///   ├── ElementOverrun    ← child extends past its parent container
///   ├── LeafTooLarge      ← leaf size above DecoderConfig::max_leaf_size
///   ├── DepthExceeded     ← nesting above DecoderConfig::max_depth
///   ├── Poisoned          ← feed after an earlier error, without reset()
///   ├── Wire(WireError)   ← from ebml-wire
///   └── Io(std::io::Error)← from the reader adapters
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream ended with elements still open or a field half read.
    #[error("stream truncated: {open_elements} open element(s), {pending_bytes} pending byte(s)")]
    Truncated {
        open_elements: usize,
        pending_bytes: usize,
    },

    /// An element's header or content reaches past the end of its parent.
    ///
    /// Offsets are absolute stream positions.
    #[error("element {id} ends at offset {end}, past its parent's end at {parent_end}")]
    ElementOverrun {
        id: Identifier,
        end: u64,
        parent_end: u64,
    },

    #[error("leaf {id} declares {size} bytes, limit is {limit}")]
    LeafTooLarge { id: Identifier, size: u64, limit: u64 },

    #[error("opening {id} exceeds the nesting limit of {limit}")]
    DepthExceeded { id: Identifier, limit: usize },

    /// A previous `feed` failed; the decoder must be `reset()` first.
    #[error("decoder is poisoned by an earlier error")]
    Poisoned,

    #[error(transparent)]
    Wire(#[from] WireError),

    /// An I/O error from the reader adapters.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
