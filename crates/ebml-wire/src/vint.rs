//! Variable-length integers as used for element identifiers and sizes.
//!
//! The encoded length is announced by the position of the highest set bit
//! of the first byte. A zero first byte extends the scheme by one more
//! byte of lookahead:
//!
//! ```text
//! first byte   second byte   length
//! 1xxx_xxxx    -             1
//! 01xx_xxxx    -             2
//! ...
//! 0000_0001    -             8
//! 0000_0000    1xxx_xxxx     9
//! 0000_0000    0xxx_xxxx     10
//! ```
//!
//! Identifiers keep the marker bit (`decode_raw`); sizes have it cleared
//! (`decode_masked`). Values wider than 64 bits keep their low 64 bits.

use crate::error::WireError;

/// Maximum number of bytes a vint can occupy.
pub const MAX_VINT_BYTES: usize = 10;

/// Determine the total encoded length from the leading byte(s).
///
/// Returns `None` when `prefix` is empty, or when it holds only a single
/// zero byte: in that case the length depends on the next byte, which has
/// not been seen yet.
#[must_use]
pub fn encoded_length(prefix: &[u8]) -> Option<usize> {
    let (&first, rest) = prefix.split_first()?;
    if first != 0 {
        return Some(first.leading_zeros() as usize + 1);
    }
    let &second = rest.first()?;
    Some(if second & 0x80 == 0 { 10 } else { 9 })
}

/// Bit that carries the length marker once the bytes are folded into a
/// `u64`. A 10-byte vint has its marker outside the low 64 bits.
const fn marker_mask(length: usize) -> u64 {
    if length <= 9 { 1 << (7 * length) } else { 0 }
}

fn accumulate(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Decode a vint keeping its length marker (identifier convention).
///
/// # Returns
///
/// `(value, bytes_consumed)` on success.
///
/// # Errors
///
/// [`WireError::UnexpectedEof`] if `buf` is shorter than the announced
/// length, or too short to announce one.
pub fn decode_raw(buf: &[u8]) -> Result<(u64, usize), WireError> {
    let length = encoded_length(buf).ok_or(WireError::UnexpectedEof {
        needed: buf.len() + 1,
        available: buf.len(),
    })?;
    let bytes = buf.get(..length).ok_or(WireError::UnexpectedEof {
        needed: length,
        available: buf.len(),
    })?;
    Ok((accumulate(bytes), length))
}

/// Decode a vint with its length marker cleared (size convention).
///
/// # Errors
///
/// Same as [`decode_raw`].
pub fn decode_masked(buf: &[u8]) -> Result<(u64, usize), WireError> {
    let (raw, length) = decode_raw(buf)?;
    Ok((raw & !marker_mask(length), length))
}

/// Number of bytes [`encode_size`] uses for `value`.
#[must_use]
pub fn size_length(value: u64) -> usize {
    (1..MAX_VINT_BYTES)
        .find(|&length| value < marker_mask(length))
        .unwrap_or(MAX_VINT_BYTES)
}

/// Encode a size with the shortest possible length.
///
/// # Returns
///
/// The number of bytes written (1–10).
///
/// # Panics
///
/// Panics if `buf` is shorter than the required encoding length.
/// A 10-byte buffer is always sufficient.
///
/// # Wire format examples
///
/// | Value     | Encoded bytes            | Length |
/// |-----------|--------------------------|--------|
/// | 0         | `[0x80]`                 | 1      |
/// | 1         | `[0x81]`                 | 1      |
/// | 127       | `[0xFF]`                 | 1      |
/// | 128       | `[0x40, 0x80]`           | 2      |
/// | 2^56      | `[0x00, 0x81, 0, …, 0]`  | 9      |
pub fn encode_size(value: u64, buf: &mut [u8]) -> usize {
    let length = size_length(value);
    write_unchecked(value, length, buf)
}

/// Encode a size using exactly `length` bytes.
///
/// # Errors
///
/// - [`WireError::InvalidLength`] if `length` is not in 1..=10.
/// - [`WireError::ValueTooLarge`] if `value` needs more bits than `length`
///   provides.
///
/// # Panics
///
/// Panics if `buf` is shorter than `length`.
pub fn encode_size_with_length(
    value: u64,
    length: usize,
    buf: &mut [u8],
) -> Result<usize, WireError> {
    if !(1..=MAX_VINT_BYTES).contains(&length) {
        return Err(WireError::InvalidLength { length });
    }
    if length < MAX_VINT_BYTES && value >= marker_mask(length) {
        return Err(WireError::ValueTooLarge { value, length });
    }
    Ok(write_unchecked(value, length, buf))
}

fn write_unchecked(value: u64, length: usize, buf: &mut [u8]) -> usize {
    let tagged = (value | marker_mask(length)).to_be_bytes();
    match length {
        1..=8 => buf[..length].copy_from_slice(&tagged[8 - length..]),
        9 => {
            buf[0] = 0;
            buf[1..9].copy_from_slice(&tagged);
        }
        _ => {
            buf[0] = 0;
            buf[1] = 0x40;
            buf[2..10].copy_from_slice(&tagged);
        }
    }
    length
}

/// Write an identifier's significant bytes verbatim.
///
/// Identifiers already carry their length marker, so no bits are added.
/// Only identifiers of 1 to 8 bytes can be represented in a `u64`.
///
/// # Errors
///
/// [`WireError::InvalidIdentifier`] if `id` is zero or its leading byte
/// announces a length different from its significant byte count.
///
/// # Panics
///
/// Panics if `buf` is shorter than the identifier's length.
pub fn encode_identifier(id: u64, buf: &mut [u8]) -> Result<usize, WireError> {
    let significant = 8 - id.leading_zeros() as usize / 8;
    let bytes = id.to_be_bytes();
    let bytes = &bytes[8 - significant..];
    if significant == 0 || encoded_length(bytes) != Some(significant) {
        return Err(WireError::InvalidIdentifier { id });
    }
    buf[..significant].copy_from_slice(bytes);
    Ok(significant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = [0u8; MAX_VINT_BYTES];
        let len = encode_size(value, &mut buf);
        buf[..len].to_vec()
    }

    #[test]
    fn length_from_first_byte() {
        assert_eq!(encoded_length(&[0x80]), Some(1));
        assert_eq!(encoded_length(&[0x40]), Some(2));
        assert_eq!(encoded_length(&[0x20]), Some(3));
        assert_eq!(encoded_length(&[0x1A]), Some(4));
        assert_eq!(encoded_length(&[0x01]), Some(8));
    }

    #[test]
    fn zero_first_byte_needs_lookahead() {
        assert_eq!(encoded_length(&[]), None);
        assert_eq!(encoded_length(&[0x00]), None);
        assert_eq!(encoded_length(&[0x00, 0x80]), Some(9));
        assert_eq!(encoded_length(&[0x00, 0x7F]), Some(10));
        assert_eq!(encoded_length(&[0x00, 0x00]), Some(10));
    }

    #[test]
    fn one_byte_size_and_identifier() {
        assert_eq!(decode_masked(&[0x81]).unwrap(), (0x01, 1));
        assert_eq!(decode_raw(&[0x81]).unwrap(), (0x81, 1));
    }

    #[test]
    fn two_byte_size() {
        assert_eq!(decode_masked(&[0x40, 0x80]).unwrap(), (0x80, 2));
        assert_eq!(decode_raw(&[0x40, 0x80]).unwrap(), (0x4080, 2));
    }

    #[test]
    fn eight_byte_size() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(decode_masked(&buf).unwrap(), (0x0002_0304_0506_0708, 8));
        assert_eq!(decode_raw(&buf).unwrap(), (0x0102_0304_0506_0708, 8));
    }

    #[test]
    fn nine_byte_size_clears_marker_of_second_byte() {
        let buf = [0x00, 0x80, 0, 0, 0, 0, 0, 0x01, 0x00];
        assert_eq!(decode_masked(&buf).unwrap(), (0x0100, 9));

        let buf = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(decode_masked(&buf).unwrap(), (u64::MAX >> 1, 9));
    }

    #[test]
    fn ten_byte_size_keeps_low_64_bits() {
        let buf = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE];
        assert_eq!(decode_masked(&buf).unwrap(), (u64::MAX - 1, 10));
    }

    #[test]
    fn ten_byte_identifier_keeps_low_64_bits() {
        let buf = [0x00, 0x40, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(decode_raw(&buf).unwrap(), (0x1234_5678_9ABC_DEF0, 10));
        let buf = [0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0xAB];
        assert_eq!(decode_raw(&buf).unwrap(), (0xAB, 10));
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let buf = [0x42, 0x86, 0x81, 0x01];
        assert_eq!(decode_raw(&buf).unwrap(), (0x4286, 2));
    }

    #[test]
    fn decode_empty_input() {
        assert!(matches!(
            decode_raw(&[]),
            Err(WireError::UnexpectedEof { needed: 1, available: 0 })
        ));
    }

    #[test]
    fn decode_truncated() {
        assert!(matches!(
            decode_masked(&[0x10, 0x00]),
            Err(WireError::UnexpectedEof { needed: 4, available: 2 })
        ));
        assert!(matches!(
            decode_masked(&[0x00]),
            Err(WireError::UnexpectedEof { needed: 2, available: 1 })
        ));
    }

    #[test]
    fn encode_minimal_lengths() {
        assert_eq!(encode(0), vec![0x80]);
        assert_eq!(encode(1), vec![0x81]);
        assert_eq!(encode(127), vec![0xFF]);
        assert_eq!(encode(128), vec![0x40, 0x80]);
        assert_eq!(encode((1 << 56) - 1).len(), 8);
        assert_eq!(encode(1 << 56).len(), 9);
        assert_eq!(encode(1 << 63).len(), 10);
        assert_eq!(encode(u64::MAX).len(), 10);
    }

    #[test]
    fn roundtrip_boundary_values() {
        let values = [
            0,
            1,
            126,
            127,
            128,
            16383,
            16384,
            (1 << 56) - 1,
            1 << 56,
            (1 << 63) - 1,
            1 << 63,
            u64::MAX,
        ];
        for &value in &values {
            let encoded = encode(value);
            let (decoded, consumed) = decode_masked(&encoded).unwrap();
            assert_eq!(decoded, value, "roundtrip failed for {value}");
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn forced_length_pads_with_marker() {
        let mut buf = [0u8; MAX_VINT_BYTES];
        let n = encode_size_with_length(5, 4, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x10, 0x00, 0x00, 0x05]);

        for length in 1..=MAX_VINT_BYTES {
            let n = encode_size_with_length(42, length, &mut buf).unwrap();
            assert_eq!(n, length);
            assert_eq!(decode_masked(&buf[..n]).unwrap(), (42, length));
        }
    }

    #[test]
    fn forced_length_rejects_overflow() {
        let mut buf = [0u8; MAX_VINT_BYTES];
        assert!(matches!(
            encode_size_with_length(128, 1, &mut buf),
            Err(WireError::ValueTooLarge { value: 128, length: 1 })
        ));
        assert!(matches!(
            encode_size_with_length(1, 0, &mut buf),
            Err(WireError::InvalidLength { length: 0 })
        ));
        assert!(matches!(
            encode_size_with_length(1, 11, &mut buf),
            Err(WireError::InvalidLength { length: 11 })
        ));
    }

    #[test]
    fn identifier_written_verbatim() {
        let mut buf = [0u8; MAX_VINT_BYTES];
        let n = encode_identifier(0x1A45_DFA3, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x1A, 0x45, 0xDF, 0xA3]);
        assert_eq!(decode_raw(&buf[..n]).unwrap(), (0x1A45_DFA3, 4));

        let n = encode_identifier(0x81, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x81]);
    }

    #[test]
    fn identifier_without_matching_marker_rejected() {
        let mut buf = [0u8; MAX_VINT_BYTES];
        assert!(matches!(
            encode_identifier(0, &mut buf),
            Err(WireError::InvalidIdentifier { id: 0 })
        ));
        // 0x01 announces an 8-byte vint but is a single byte.
        assert!(matches!(
            encode_identifier(0x01, &mut buf),
            Err(WireError::InvalidIdentifier { id: 0x01 })
        ));
        assert!(matches!(
            encode_identifier(0x8001, &mut buf),
            Err(WireError::InvalidIdentifier { .. })
        ));
    }
}
