use ebml_wire::vint::{MAX_VINT_BYTES, encoded_length};

/// Bytes of an identifier or size field whose remainder has not arrived.
///
/// Never holds a complete field: bytes are stashed only when the field
/// cannot be finished from what is available, so it stays below
/// [`MAX_VINT_BYTES`].
#[derive(Debug)]
pub(crate) struct PendingBuffer {
    bytes: Vec<u8>,
}

impl PendingBuffer {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(MAX_VINT_BYTES),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Length of the field that starts with the pending bytes followed by
    /// `input`, if enough of it is visible to tell.
    pub(crate) fn field_length(&self, input: &[u8]) -> Option<usize> {
        let mut prefix = [0u8; 2];
        let mut seen = 0;
        for (slot, &byte) in prefix.iter_mut().zip(self.bytes.iter().chain(input)) {
            *slot = byte;
            seen += 1;
        }
        encoded_length(&prefix[..seen])
    }

    pub(crate) fn stash(&mut self, input: &[u8]) {
        self.bytes.extend_from_slice(input);
        debug_assert!(self.bytes.len() < MAX_VINT_BYTES);
    }

    /// Hand the complete `length`-byte field to `decode`.
    ///
    /// Returns the decoded value and the number of bytes taken from
    /// `input`, or `None` (leaving everything untouched) when pending plus
    /// `input` is still short of `length`. When nothing is pending the
    /// field is decoded in place without copying.
    pub(crate) fn complete<T>(
        &mut self,
        input: &[u8],
        length: usize,
        decode: impl FnOnce(&[u8]) -> T,
    ) -> Option<(T, usize)> {
        debug_assert!(self.bytes.len() < length);
        let from_input = length - self.bytes.len();
        if input.len() < from_input {
            return None;
        }
        if self.bytes.is_empty() {
            return Some((decode(&input[..length]), length));
        }
        self.bytes.extend_from_slice(&input[..from_input]);
        let value = decode(&self.bytes);
        self.bytes.clear();
        Some((value, from_input))
    }
}
