//! Opaque 64-bit values.
//!
//! A [`Hash64`] is the eight little-endian bytes of a 64-bit wire value. It is
//! meant for fields such as fingerprints or IDs that are compared and stored
//! but never computed with, and it is usable as a map key. It converts to and
//! from decimal strings (signed or unsigned), `0x`-prefixed hex strings and
//! split halves.

use crate::arith::{join_signed_decimal_string, join_unsigned_decimal_string, Int64, Split64};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Eight bytes holding a 64-bit value, least significant byte first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash64(pub [u8; 8]);

impl Hash64 {
    /// The all-zero hash
    pub const ZERO: Hash64 = Hash64([0; 8]);

    /// Builds a hash from split halves
    pub const fn from_split(value: Split64) -> Self {
        let lo = value.lo.to_le_bytes();
        let hi = value.hi.to_le_bytes();
        Hash64([lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]])
    }

    /// Splits the hash into halves; bytes 0..4 form the low half
    pub const fn to_split(self) -> Split64 {
        let b = self.0;
        Split64::new(
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
        )
    }

    /// Builds a hash from an unsigned integer
    pub const fn from_u64(value: u64) -> Self {
        Hash64(value.to_le_bytes())
    }

    /// Reads the hash as an unsigned integer
    pub const fn to_u64(self) -> u64 {
        u64::from_le_bytes(self.0)
    }

    /// Builds a hash from a signed integer
    pub const fn from_i64(value: i64) -> Self {
        Hash64(value.to_le_bytes())
    }

    /// Reads the hash as a signed integer
    pub const fn to_i64(self) -> i64 {
        i64::from_le_bytes(self.0)
    }

    /// Renders the hash as a decimal number.
    ///
    /// With `signed` set, the bytes are read as two's complement.
    pub fn to_decimal_string(self, signed: bool) -> String {
        let split = self.to_split();
        if signed {
            join_signed_decimal_string(split.lo, split.hi)
        } else {
            join_unsigned_decimal_string(split.lo, split.hi)
        }
    }

    /// Parses a decimal number, with an optional leading `-` for negative
    /// values stored in two's complement
    pub fn from_decimal_str(s: &str) -> Result<Self> {
        if s.starts_with('-') {
            Ok(Hash64::from_split(Int64::from_decimal_str(s)?.as_unsigned()))
        } else {
            Ok(Hash64::from_split(Split64::from_decimal_str(s)?))
        }
    }

    /// Renders the hash as `0x` followed by 16 lowercase hex digits, most
    /// significant byte first
    pub fn to_hex_string(self) -> String {
        let mut out = String::with_capacity(18);
        out.push_str("0x");
        for byte in self.0.iter().rev() {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    /// Parses `0x` followed by exactly 16 hex digits (either case)
    pub fn from_hex_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .filter(|d| d.len() == 16 && d.bytes().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| Error::invalid_hex(s))?;

        let mut bytes = [0u8; 8];
        for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| Error::invalid_hex(s))?;
            bytes[7 - i] = u8::from_str_radix(pair, 16).map_err(|_| Error::invalid_hex(s))?;
        }
        Ok(Hash64(bytes))
    }
}

impl From<Split64> for Hash64 {
    fn from(value: Split64) -> Self {
        Hash64::from_split(value)
    }
}

impl From<Hash64> for Split64 {
    fn from(value: Hash64) -> Self {
        value.to_split()
    }
}

impl From<u64> for Hash64 {
    fn from(value: u64) -> Self {
        Hash64::from_u64(value)
    }
}

impl fmt::Display for Hash64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl FromStr for Hash64 {
    type Err = Error;

    /// Accepts either the hex form or a decimal number
    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("0x") || s.starts_with("0X") {
            Hash64::from_hex_str(s)
        } else {
            Hash64::from_decimal_str(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_split_layout() {
        let hash = Hash64([0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(hash.to_split(), Split64::new(0x0403_0201, 0x0807_0605));
        assert_eq!(Hash64::from_split(hash.to_split()), hash);
        assert_eq!(hash.to_u64(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn test_decimal_round_trip() {
        let unsigned = ["0", "1", "9223372036854775808", "18446744073709551615", "16948784802625696584"];
        for s in unsigned {
            let hash = Hash64::from_decimal_str(s).unwrap();
            assert_eq!(hash.to_decimal_string(false), s);
            assert_eq!(Split64::from(hash).to_string(), s);
        }

        let signed = ["0", "-1", "-9223372036854775808", "9223372036854775807", "-6649058714086158188"];
        for s in signed {
            let hash = Hash64::from_decimal_str(s).unwrap();
            assert_eq!(hash.to_decimal_string(true), s);
        }

        assert_eq!(
            Hash64::from_decimal_str("-1").unwrap().to_decimal_string(false),
            "18446744073709551615"
        );
        assert!(Hash64::from_decimal_str("18446744073709551616").is_err());
        assert!(Hash64::from_decimal_str("1x").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let hash = Hash64::from_u64(0x0123_4567_89AB_CDEF);
        assert_eq!(hash.to_hex_string(), "0x0123456789abcdef");
        assert_eq!(Hash64::from_hex_str("0x0123456789ABCDEF").unwrap(), hash);
        assert_eq!(Hash64::from_i64(-1).to_hex_string(), "0xffffffffffffffff");
        assert_eq!(Hash64::ZERO.to_hex_string(), "0x0000000000000000");

        assert!(Hash64::from_hex_str("0123456789abcdef").is_err());
        assert!(Hash64::from_hex_str("0x0123").is_err());
        assert!(Hash64::from_hex_str("0x0123456789abcdeg").is_err());
    }

    #[test]
    fn test_decimal_hex_split_chain() {
        let values = [
            "0",
            "-1",
            "18446744073709551615",
            "9223372036854775808",
            "-9223372036854775808",
            "123456789012345678",
            "-987654321098765432",
            "555555555555555555",
        ];
        for s in values {
            let hex = Hash64::from_decimal_str(s).unwrap().to_hex_string();
            let split = Hash64::from_hex_str(&hex).unwrap().to_split();
            let back = if s.starts_with('-') {
                Int64(split).to_decimal_string()
            } else {
                split.to_decimal_string()
            };
            assert_eq!(back, s, "via {hex}");
        }
    }

    #[test]
    fn test_from_str() {
        let a: Hash64 = "0x00000000000000ff".parse().unwrap();
        let b: Hash64 = "255".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0x00000000000000ff");
    }

    #[test]
    fn test_map_key() {
        let mut map = HashMap::new();
        map.insert(Hash64::from_u64(u64::MAX), "max");
        map.insert(Hash64::from_i64(i64::MIN), "min");
        assert_eq!(map.get(&Hash64::from_i64(-1)), Some(&"max"));
        assert_eq!(map.get(&Hash64::from_u64(1 << 63)), Some(&"min"));
    }
}
