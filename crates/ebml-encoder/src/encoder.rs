use std::io::Write;

use ebml_wire::value::{write_ascii, write_float, write_float32, write_signed, write_unsigned};
use ebml_wire::vint::{MAX_VINT_BYTES, encode_identifier, encode_size};
use ebml_wire::{Identifier, WireError};

use crate::error::EncodeError;

/// EBML encoder: builds a stream of nested elements.
///
/// The encoder is the producing counterpart of the streaming decoder. It
/// follows a builder pattern: [`open_container`](Self::open_container)
/// starts a container, `add_*` methods append leaves to the innermost open
/// container (or to the top level), and
/// [`close_container`](Self::close_container) finishes it.
///
/// Containers are assembled bottom-up: a container's children are written
/// into a scratch body, and only when it closes is its header written with
/// the exact body length. Sizes therefore always use the shortest vint.
///
/// Identifiers are passed as their raw wire value, marker bits included
/// (`0x1A45_DFA3`, not `0x0A45_DFA3`).
///
/// # Usage
///
/// ```rust
/// use ebml_encoder::EbmlEncoder;
///
/// let stream = EbmlEncoder::new()
///     .open_container(0x1A45_DFA3)
///     .add_unsigned(0x4286, 1)
///     .close_container()
///     .encode()
///     .unwrap();
///
/// assert_eq!(stream, [0x1A, 0x45, 0xDF, 0xA3, 0x84, 0x42, 0x86, 0x81, 0x01]);
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────┐
/// │ [1-8 bytes]  │ Identifier, written verbatim             │
/// │ [1-10 bytes] │ Content size, shortest vint              │
/// │ [size bytes] │ Leaf value, or the container's children  │
/// │ ...          │ next top-level element                   │
/// └──────────────┴──────────────────────────────────────────┘
/// ```
#[derive(Debug, Default)]
pub struct EbmlEncoder {
    /// Completed top-level elements.
    output: Vec<u8>,
    open: Vec<OpenContainer>,
    elements: usize,
    /// First builder misuse, reported by `encode`.
    misuse: Option<Misuse>,
}

#[derive(Debug)]
struct OpenContainer {
    id: Identifier,
    body: Vec<u8>,
}

#[derive(Clone, Copy, Debug)]
enum Misuse {
    UnbalancedClose,
    InvalidIdentifier(u64),
}

impl EbmlEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Structure ───────────────────────────────────────────────────────

    /// Start a container. Everything added until the matching
    /// [`close_container`](Self::close_container) becomes its content.
    pub fn open_container(&mut self, id: u64) -> &mut Self {
        self.elements += 1;
        self.open.push(OpenContainer {
            id: Identifier(id),
            body: Vec::new(),
        });
        self
    }

    /// Finish the innermost open container.
    ///
    /// With nothing open, the misuse is recorded and
    /// [`encode`](Self::encode) returns [`EncodeError::UnbalancedClose`].
    pub fn close_container(&mut self) -> &mut Self {
        let Some(container) = self.open.pop() else {
            self.record(Misuse::UnbalancedClose);
            return self;
        };
        self.write_element(container.id, &container.body);
        self
    }

    /// Number of containers currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    // ── Leaves ──────────────────────────────────────────────────────────

    /// Add a leaf with raw content.
    pub fn add_binary(&mut self, id: u64, content: &[u8]) -> &mut Self {
        self.elements += 1;
        self.write_element(Identifier(id), content);
        self
    }

    /// Add an unsigned integer leaf, stored in its shortest big-endian form.
    pub fn add_unsigned(&mut self, id: u64, value: u64) -> &mut Self {
        self.add_binary(id, &write_unsigned(value))
    }

    /// Add a signed integer leaf, stored in its shortest two's-complement
    /// form.
    pub fn add_signed(&mut self, id: u64, value: i64) -> &mut Self {
        self.add_binary(id, &write_signed(value))
    }

    /// Add an 8-byte IEEE 754 float leaf.
    pub fn add_float(&mut self, id: u64, value: f64) -> &mut Self {
        self.add_binary(id, &write_float(value))
    }

    /// Add a 4-byte IEEE 754 float leaf.
    pub fn add_float32(&mut self, id: u64, value: f32) -> &mut Self {
        self.add_binary(id, &write_float32(value))
    }

    /// Add a string leaf, one byte per character. Characters above
    /// `U+00FF` are written as `?`.
    pub fn add_string(&mut self, id: u64, value: &str) -> &mut Self {
        self.add_binary(id, &write_ascii(value))
    }

    // ── Output ──────────────────────────────────────────────────────────

    /// Serialize every element added so far.
    ///
    /// The encoder is left untouched, so more elements may be added and
    /// `encode` called again.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::UnbalancedClose`] or [`EncodeError::Wire`] if the
    ///   builder was misused; the first misuse wins.
    /// - [`EncodeError::UnclosedContainers`] if containers are still open.
    /// - [`EncodeError::EmptyPayload`] if nothing was added.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        Ok(self.output.clone())
    }

    /// Serialize into `w` instead of a fresh buffer.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Same as [`encode`](Self::encode), plus [`EncodeError::Io`] if the
    /// writer fails.
    pub fn write_to(&self, w: &mut impl Write) -> Result<usize, EncodeError> {
        self.validate()?;
        w.write_all(&self.output)?;
        Ok(self.output.len())
    }

    fn validate(&self) -> Result<(), EncodeError> {
        match self.misuse {
            Some(Misuse::UnbalancedClose) => return Err(EncodeError::UnbalancedClose),
            Some(Misuse::InvalidIdentifier(id)) => {
                return Err(WireError::InvalidIdentifier { id }.into());
            }
            None => {}
        }
        if !self.open.is_empty() {
            return Err(EncodeError::UnclosedContainers {
                depth: self.open.len(),
            });
        }
        if self.elements == 0 {
            return Err(EncodeError::EmptyPayload);
        }
        Ok(())
    }

    /// Frame `content` under `id` into the innermost open container, or the
    /// top level.
    fn write_element(&mut self, id: Identifier, content: &[u8]) {
        let mut id_buf = [0u8; MAX_VINT_BYTES];
        let Ok(id_len) = encode_identifier(id.raw(), &mut id_buf) else {
            self.record(Misuse::InvalidIdentifier(id.raw()));
            return;
        };
        let mut size_buf = [0u8; MAX_VINT_BYTES];
        let size_len = encode_size(content.len() as u64, &mut size_buf);

        let sink = match self.open.last_mut() {
            Some(parent) => &mut parent.body,
            None => &mut self.output,
        };

        sink.extend_from_slice(&id_buf[..id_len]);
        sink.extend_from_slice(&size_buf[..size_len]);
        sink.extend_from_slice(content);
    }

    fn record(&mut self, misuse: Misuse) {
        self.misuse.get_or_insert(misuse);
    }
}
