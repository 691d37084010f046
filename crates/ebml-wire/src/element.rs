use crate::error::WireError;
use crate::identifier::Identifier;
use crate::vint::{MAX_VINT_BYTES, decode_masked, decode_raw, encode_identifier, encode_size};

/// Element header: the two vints in front of every element's content.
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ id     (vint, marker kept, 1-8 bytes typically)  │
/// │ size   (vint, marker cleared, 1-10 bytes)        │
/// │ content [size bytes, raw or nested elements]     │
/// └──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementHeader {
    pub id: Identifier,

    /// Content length in bytes, header excluded.
    pub size: u64,
}

impl ElementHeader {
    #[must_use]
    pub fn new(id: Identifier, size: u64) -> Self {
        Self { id, size }
    }

    /// Write the header to the provided writer.
    ///
    /// # Returns
    ///
    /// Total number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`WireError::InvalidIdentifier`] if the identifier cannot be
    ///   written verbatim.
    /// - [`WireError::Io`] if the writer fails.
    pub fn write_to(&self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        let mut buf = [0u8; MAX_VINT_BYTES];

        let n = encode_identifier(self.id.raw(), &mut buf)?;
        w.write_all(&buf[..n])?;
        let mut written = n;

        let n = encode_size(self.size, &mut buf);
        w.write_all(&buf[..n])?;
        written += n;

        Ok(written)
    }

    /// Read a header from a slice that holds it completely.
    ///
    /// This is the one-shot counterpart of the streaming decoder, for code
    /// that already has the whole header in memory.
    ///
    /// # Returns
    ///
    /// `(header, bytes_consumed)`.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if the slice ends inside either vint.
    pub fn read_from(buf: &[u8]) -> Result<(Self, usize), WireError> {
        let (id, id_len) = decode_raw(buf)?;
        let (size, size_len) = decode_masked(&buf[id_len..])?;
        Ok((Self::new(Identifier(id), size), id_len + size_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let header = ElementHeader::new(Identifier(0x1A45_DFA3), 300);
        let mut out = Vec::new();
        let written = header.write_to(&mut out).unwrap();
        assert_eq!(out, vec![0x1A, 0x45, 0xDF, 0xA3, 0x41, 0x2C]);
        assert_eq!(written, out.len());

        let (read, consumed) = ElementHeader::read_from(&out).unwrap();
        assert_eq!(read, header);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn read_leaves_content_alone() {
        let buf = [0x81, 0x83, b'a', b'b', b'c'];
        let (header, consumed) = ElementHeader::read_from(&buf).unwrap();
        assert_eq!(header, ElementHeader::new(Identifier(0x81), 3));
        assert_eq!(&buf[consumed..], b"abc");
    }

    #[test]
    fn read_truncated_size() {
        let result = ElementHeader::read_from(&[0x81, 0x40]);
        assert!(matches!(result, Err(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn write_invalid_identifier() {
        let header = ElementHeader::new(Identifier(0x01), 0);
        let result = header.write_to(&mut Vec::new());
        assert!(matches!(result, Err(WireError::InvalidIdentifier { id: 0x01 })));
    }
}
