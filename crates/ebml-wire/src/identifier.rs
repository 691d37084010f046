use std::fmt;
use std::str::FromStr;

/// Element identifier, kept with its length marker bits.
///
/// Because the marker stays in place, identifiers of different encoded
/// lengths never compare equal: `0x81` (one byte) and `0x4081` (two
/// bytes) are distinct elements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(pub u64);

impl Identifier {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for Identifier {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Identifier> for u64 {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

/// Parses `0x`-prefixed hexadecimal or plain decimal.
impl FromStr for Identifier {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).map(Self),
            None => s.parse().map(Self),
        }
    }
}
