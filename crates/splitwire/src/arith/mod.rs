//! 64-bit integers as pairs of 32-bit halves.
//!
//! [`Split64`] holds an unsigned 64-bit value as `{lo, hi}` and implements
//! its arithmetic with explicit carries between the halves. [`Int64`] is the
//! same bit pattern read as two's complement. Both convert losslessly to and
//! from the native integer types, which the varint and fixed-width codecs use
//! directly; the split form exists for code that works on the halves of a
//! wire value (hashes, zigzag on halves, decimal rendering).
//!
//! ## Example
//!
//! ```
//! use splitwire::arith::Split64;
//!
//! let a: Split64 = "18446744073709551615".parse()?;
//! assert_eq!(a, Split64::MAX);
//!
//! let (q, r) = a.div_rem(10).unwrap();
//! assert_eq!(q.to_string(), "1844674407370955161");
//! assert_eq!(r.lo, 5);
//! # Ok::<(), splitwire::Error>(())
//! ```

pub mod decimal;

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

pub use decimal::{join_signed_decimal_string, join_unsigned_decimal_string};

/// An unsigned 64-bit integer stored as two 32-bit halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Split64 {
    /// Low 32 bits
    pub lo: u32,
    /// High 32 bits
    pub hi: u32,
}

impl Split64 {
    /// Zero
    pub const ZERO: Split64 = Split64 { lo: 0, hi: 0 };

    /// 2^64 - 1
    pub const MAX: Split64 = Split64 {
        lo: u32::MAX,
        hi: u32::MAX,
    };

    /// Largest value that can be multiplied by ten without wrapping
    const MAX_DIV_10: Split64 = Split64::from_u64(u64::MAX / 10);

    /// Creates a value from its halves
    pub const fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    /// Splits a native integer into halves
    pub const fn from_u64(value: u64) -> Self {
        Self {
            lo: value as u32,
            hi: (value >> 32) as u32,
        }
    }

    /// Joins the halves into a native integer
    pub const fn to_u64(self) -> u64 {
        ((self.hi as u64) << 32) | self.lo as u64
    }

    /// Returns true if both halves are zero
    pub const fn is_zero(self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Returns true if bit 63 is set
    pub const fn msb(self) -> bool {
        self.hi & 0x8000_0000 != 0
    }

    /// Returns true if bit 0 is set
    pub const fn lsb(self) -> bool {
        self.lo & 1 != 0
    }

    /// Shifts left by one bit, discarding bit 63
    pub const fn left_shift(self) -> Self {
        Self {
            lo: self.lo << 1,
            hi: (self.hi << 1) | (self.lo >> 31),
        }
    }

    /// Shifts right by one bit, filling bit 63 with zero
    pub const fn right_shift(self) -> Self {
        Self {
            lo: (self.lo >> 1) | (self.hi << 31),
            hi: self.hi >> 1,
        }
    }

    /// Divides by a 32-bit divisor using restoring binary long division.
    ///
    /// Returns `(quotient, remainder)`, or `None` when `divisor` is zero.
    pub fn div_rem(self, divisor: u32) -> Option<(Split64, Split64)> {
        if divisor == 0 {
            return None;
        }

        let mut quotient = Split64::ZERO;
        let mut remainder = self;
        let mut divisor = Split64::new(divisor, 0);
        let mut unit = Split64::new(1, 0);

        // Align the divisor's top bit with bit 63.
        while !divisor.msb() {
            divisor = divisor.left_shift();
            unit = unit.left_shift();
        }

        while !unit.is_zero() {
            if remainder >= divisor {
                quotient = quotient + unit;
                remainder = remainder - divisor;
            }
            divisor = divisor.right_shift();
            unit = unit.right_shift();
        }

        Some((quotient, remainder))
    }

    /// Renders the value in decimal by repeated division by ten
    pub fn to_decimal_string(self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let mut digits = Vec::with_capacity(20);
        let mut value = self;
        while !value.is_zero() {
            // Ten is never zero.
            let Some((quotient, remainder)) = value.div_rem(10) else {
                break;
            };
            digits.push(b'0' + remainder.lo as u8);
            value = quotient;
        }
        digits.iter().rev().map(|&d| d as char).collect()
    }

    /// Parses an unsigned decimal string by repeated multiply-by-ten-and-add.
    ///
    /// Fails on an empty string, any non-digit character, or a value above
    /// 2^64 - 1.
    pub fn from_decimal_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::invalid_decimal(s));
        }

        let mut acc = Split64::ZERO;
        for c in s.bytes() {
            if !c.is_ascii_digit() {
                return Err(Error::invalid_decimal(s));
            }
            if acc > Self::MAX_DIV_10 {
                return Err(Error::invalid_decimal(s));
            }
            let scaled = acc * 10;
            acc = scaled + Split64::new(u32::from(c - b'0'), 0);
            if acc < scaled {
                return Err(Error::invalid_decimal(s));
            }
        }
        Ok(acc)
    }

    /// Applies the zigzag transform `(n << 1) ^ (n >> 63)` to the halves
    pub const fn zigzag_encode(self) -> Self {
        let sign_mask = ((self.hi as i32) >> 31) as u32;
        Self {
            lo: (self.lo << 1) ^ sign_mask,
            hi: ((self.hi << 1) | (self.lo >> 31)) ^ sign_mask,
        }
    }

    /// Reverses [`zigzag_encode`](Self::zigzag_encode)
    pub const fn zigzag_decode(self) -> Self {
        let sign_mask = (self.lo & 1).wrapping_neg();
        Self {
            lo: ((self.lo >> 1) | (self.hi << 31)) ^ sign_mask,
            hi: (self.hi >> 1) ^ sign_mask,
        }
    }

    /// Reinterprets the bit pattern as a signed value
    pub const fn as_signed(self) -> Int64 {
        Int64(self)
    }
}

/// Multiplies two 32-bit values into a 64-bit product from 16-bit pieces
fn mul32x32(a: u32, b: u32) -> Split64 {
    let a_low = a & 0xFFFF;
    let a_high = a >> 16;
    let b_low = b & 0xFFFF;
    let b_high = b >> 16;

    let cross_a = a_high * b_low;
    let cross_b = a_low * b_high;

    let mut carries = 0u32;
    let (low, c) = (a_low * b_low).overflowing_add((cross_a & 0xFFFF) << 16);
    carries += u32::from(c);
    let (low, c) = low.overflowing_add((cross_b & 0xFFFF) << 16);
    carries += u32::from(c);

    let high = (a_high * b_high)
        .wrapping_add(cross_a >> 16)
        .wrapping_add(cross_b >> 16)
        .wrapping_add(carries);

    Split64::new(low, high)
}

impl Add for Split64 {
    type Output = Split64;

    /// Wrapping addition modulo 2^64
    fn add(self, rhs: Split64) -> Split64 {
        let lo = self.lo.wrapping_add(rhs.lo);
        let carry = u32::from(lo < self.lo);
        Split64::new(lo, self.hi.wrapping_add(rhs.hi).wrapping_add(carry))
    }
}

impl Sub for Split64 {
    type Output = Split64;

    /// Wrapping subtraction modulo 2^64
    fn sub(self, rhs: Split64) -> Split64 {
        let lo = self.lo.wrapping_sub(rhs.lo);
        let borrow = u32::from(self.lo < rhs.lo);
        Split64::new(lo, self.hi.wrapping_sub(rhs.hi).wrapping_sub(borrow))
    }
}

impl Mul<u32> for Split64 {
    type Output = Split64;

    /// Multiplies by a 32-bit value, truncating the product to 64 bits
    fn mul(self, rhs: u32) -> Split64 {
        let lo = mul32x32(self.lo, rhs);
        let hi = mul32x32(self.hi, rhs);
        Split64::new(lo.lo, lo.hi.wrapping_add(hi.lo))
    }
}

impl Ord for Split64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hi.cmp(&other.hi).then(self.lo.cmp(&other.lo))
    }
}

impl PartialOrd for Split64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for Split64 {
    fn from(value: u64) -> Self {
        Split64::from_u64(value)
    }
}

impl From<Split64> for u64 {
    fn from(value: Split64) -> Self {
        value.to_u64()
    }
}

impl fmt::Display for Split64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_unsigned_decimal_string(self.lo, self.hi))
    }
}

impl FromStr for Split64 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Split64::from_decimal_str(s)
    }
}

/// A two's-complement signed 64-bit integer stored as two 32-bit halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Int64(pub Split64);

impl Int64 {
    /// -2^63
    pub const MIN: Int64 = Int64(Split64::new(0, 0x8000_0000));

    /// 2^63 - 1
    pub const MAX: Int64 = Int64(Split64::new(u32::MAX, 0x7FFF_FFFF));

    /// Creates a value from its halves
    pub const fn new(lo: u32, hi: u32) -> Self {
        Int64(Split64::new(lo, hi))
    }

    /// Splits a native integer into halves
    pub const fn from_i64(value: i64) -> Self {
        Int64(Split64::from_u64(value as u64))
    }

    /// Joins the halves into a native integer
    pub const fn to_i64(self) -> i64 {
        self.0.to_u64() as i64
    }

    /// Low 32 bits
    pub const fn lo(self) -> u32 {
        self.0.lo
    }

    /// High 32 bits
    pub const fn hi(self) -> u32 {
        self.0.hi
    }

    /// Returns true if the value is below zero
    pub const fn is_negative(self) -> bool {
        self.0.msb()
    }

    /// Two's-complement negation; `MIN` negates to itself
    pub fn negate(self) -> Self {
        Int64(Split64::ZERO - self.0)
    }

    /// Reinterprets the bit pattern as unsigned
    pub const fn as_unsigned(self) -> Split64 {
        self.0
    }

    /// Renders the value in decimal by repeated division by ten
    pub fn to_decimal_string(self) -> String {
        if self.is_negative() {
            format!("-{}", self.negate().0.to_decimal_string())
        } else {
            self.0.to_decimal_string()
        }
    }

    /// Parses a decimal string with an optional leading `-`.
    ///
    /// Fails on malformed input or a value outside `-2^63..=2^63-1`.
    pub fn from_decimal_str(s: &str) -> Result<Self> {
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let magnitude = Split64::from_decimal_str(digits).map_err(|_| Error::invalid_decimal(s))?;

        if negative {
            if magnitude > Int64::MIN.0 {
                return Err(Error::invalid_decimal(s));
            }
            Ok(Int64(magnitude).negate())
        } else {
            if magnitude > Int64::MAX.0 {
                return Err(Error::invalid_decimal(s));
            }
            Ok(Int64(magnitude))
        }
    }
}

impl Add for Int64 {
    type Output = Int64;

    fn add(self, rhs: Int64) -> Int64 {
        Int64(self.0 + rhs.0)
    }
}

impl Sub for Int64 {
    type Output = Int64;

    fn sub(self, rhs: Int64) -> Int64 {
        Int64(self.0 - rhs.0)
    }
}

impl Neg for Int64 {
    type Output = Int64;

    fn neg(self) -> Int64 {
        self.negate()
    }
}

impl Ord for Int64 {
    fn cmp(&self, other: &Self) -> Ordering {
        // Flipping the sign bit maps two's complement onto unsigned order.
        let a = Split64::new(self.0.lo, self.0.hi ^ 0x8000_0000);
        let b = Split64::new(other.0.lo, other.0.hi ^ 0x8000_0000);
        a.cmp(&b)
    }
}

impl PartialOrd for Int64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Int64 {
    fn from(value: i64) -> Self {
        Int64::from_i64(value)
    }
}

impl From<Int64> for i64 {
    fn from(value: Int64) -> Self {
        value.to_i64()
    }
}

impl fmt::Display for Int64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_signed_decimal_string(self.0.lo, self.0.hi))
    }
}

impl FromStr for Int64 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Int64::from_decimal_str(s)
    }
}
