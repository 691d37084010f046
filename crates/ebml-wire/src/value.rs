//! Typed views over a leaf element's content bytes.
//!
//! The readers never fail. Lengths they cannot interpret produce a fixed
//! default (`0`, `0.0`, or an empty string) so that a consumer can log the
//! odd element and keep decoding.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────┬─────────────────┐
//! │ Reader           │ Interpretation               │ Fallback        │
//! ├──────────────────┼──────────────────────────────┼─────────────────┤
//! │ read_unsigned    │ big-endian unsigned          │ empty → 0       │
//! │ read_signed      │ big-endian two's complement  │ empty → 0       │
//! │ read_float       │ 4 → f32, 8 → f64 (IEEE-754)  │ other → 0.0     │
//! │ read_ascii       │ one char per byte            │ empty → ""      │
//! └──────────────────┴──────────────────────────────┴─────────────────┘
//! ```

/// Big-endian unsigned integer. More than 8 bytes keeps the low 64 bits.
#[must_use]
pub fn read_unsigned(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Big-endian two's-complement integer, sign-extended from the first bit.
#[must_use]
pub fn read_signed(bytes: &[u8]) -> i64 {
    let Some(&first) = bytes.first() else {
        return 0;
    };
    let seed: i64 = if first & 0x80 == 0 { 0 } else { -1 };
    bytes
        .iter()
        .fold(seed, |acc, &byte| (acc << 8) | i64::from(byte))
}

/// IEEE-754 float of 4 or 8 bytes, widened to `f64`.
///
/// The 10-byte extended precision form is not supported and reads as
/// `0.0`, like every other length.
#[must_use]
pub fn read_float(bytes: &[u8]) -> f64 {
    if let Ok(single) = <[u8; 4]>::try_from(bytes) {
        f64::from(f32::from_be_bytes(single))
    } else if let Ok(double) = <[u8; 8]>::try_from(bytes) {
        f64::from_be_bytes(double)
    } else {
        0.0
    }
}

/// Byte-for-byte string copy without validation.
///
/// Each byte maps to the char with the same code point, so bytes above
/// `0x7F` survive as Latin-1 characters instead of being rejected.
#[must_use]
pub fn read_ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Shortest big-endian encoding of `value` (at least one byte).
#[must_use]
pub fn write_unsigned(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() as usize / 8).min(7);
    bytes[skip..].to_vec()
}

/// Shortest two's-complement encoding of `value` (at least one byte).
#[must_use]
pub fn write_signed(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut skip = 0;
    // Drop a leading byte while the next one still carries the same sign.
    while skip < 7 {
        let redundant = match bytes[skip] {
            0x00 => bytes[skip + 1] & 0x80 == 0,
            0xFF => bytes[skip + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        skip += 1;
    }
    bytes[skip..].to_vec()
}

#[must_use]
pub fn write_float(value: f64) -> [u8; 8] {
    value.to_be_bytes()
}

#[must_use]
pub fn write_float32(value: f32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Inverse of [`read_ascii`]: chars above `U+00FF` are replaced by `?`.
#[must_use]
pub fn write_ascii(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| u8::try_from(c).unwrap_or(b'?'))
        .collect()
}

/// Fixed-width scalars stored as little-endian arrays inside binary leaves.
pub trait LeArrayElement: Sized {
    const WIDTH: usize;

    /// `chunk` is exactly `WIDTH` bytes long.
    fn from_le_chunk(chunk: &[u8]) -> Self;
}

macro_rules! le_array_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LeArrayElement for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn from_le_chunk(chunk: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(chunk);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

le_array_element!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

/// Read a packed little-endian array; a trailing partial element is ignored.
#[must_use]
pub fn read_le_array<T: LeArrayElement>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(T::WIDTH).map(T::from_le_chunk).collect()
}
