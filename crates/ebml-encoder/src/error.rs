use ebml_wire::WireError;

/// Errors that can occur while building an EBML stream.
///
/// Builder methods never fail on their own. Misuse (closing a container
/// that was never opened, an identifier that cannot be written) is recorded
/// and reported by [`EbmlEncoder::encode`](crate::EbmlEncoder::encode).
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── EmptyPayload         ← no elements were added before .encode()
///   ├── UnclosedContainers   ← open_container without matching close
///   ├── UnbalancedClose      ← close_container with nothing open
///   ├── Wire(WireError)      ← invalid identifier, from ebml-wire
///   └── Io(std::io::Error)   ← from underlying I/O writes
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no elements have been added to the encoder")]
    EmptyPayload,

    #[error("{depth} container(s) still open at encode time")]
    UnclosedContainers { depth: usize },

    #[error("close_container called with no open container")]
    UnbalancedClose,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
