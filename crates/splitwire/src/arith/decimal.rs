//! Fast decimal rendering of split 64-bit values.
//!
//! Values up to 2^53 are printed directly. Larger values are cut into
//! 16:24:24-bit pieces and recombined as three base-10^7 digits, which needs
//! only a handful of multiplications instead of the 64 steps of
//! [`Split64::div_rem`](super::Split64::div_rem).

const BASE: u64 = 10_000_000;

/// Largest high half whose value still fits in 53 bits
const SMALL_HI_LIMIT: u32 = 0x1F_FFFF;

/// Renders the unsigned value `hi * 2^32 + lo` in decimal
pub fn join_unsigned_decimal_string(lo: u32, hi: u32) -> String {
    if hi <= SMALL_HI_LIMIT {
        return ((u64::from(hi) << 32) | u64::from(lo)).to_string();
    }

    let low = u64::from(lo & 0xFF_FFFF);
    let mid = u64::from(((lo >> 24) | (hi << 8)) & 0xFF_FFFF);
    let high = u64::from((hi >> 16) & 0xFFFF);

    // 2^24 = 1 * 10^7 + 6777216
    // 2^48 = 28147497 * 10^7 + 6710656
    let mut digit_a = low + mid * 6_777_216 + high * 6_710_656;
    let mut digit_b = mid + high * 8_147_497;
    let mut digit_c = high * 2;

    if digit_a >= BASE {
        digit_b += digit_a / BASE;
        digit_a %= BASE;
    }
    if digit_b >= BASE {
        digit_c += digit_b / BASE;
        digit_b %= BASE;
    }

    if digit_c > 0 {
        format!("{digit_c}{digit_b:07}{digit_a:07}")
    } else {
        format!("{digit_b}{digit_a:07}")
    }
}

/// Renders the two's-complement value `hi * 2^32 + lo` in decimal
pub fn join_signed_decimal_string(lo: u32, hi: u32) -> String {
    if hi & 0x8000_0000 == 0 {
        return join_unsigned_decimal_string(lo, hi);
    }

    let neg_lo = (!lo).wrapping_add(1);
    let neg_hi = if neg_lo == 0 { (!hi).wrapping_add(1) } else { !hi };
    format!("-{}", join_unsigned_decimal_string(neg_lo, neg_hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::Split64;
    use pretty_assertions::assert_eq;

    fn split(value: u64) -> (u32, u32) {
        (value as u32, (value >> 32) as u32)
    }

    #[test]
    fn test_unsigned_matches_long_division() {
        let values = [
            0u64,
            1,
            (1 << 53) - 1,
            1 << 53,
            (1 << 53) + 1,
            10_000_000_000_000_000,
            10_000_000_000_000_001,
            1 << 63,
            16_948_784_802_625_696_584,
            u64::MAX - 1,
            u64::MAX,
        ];
        for v in values {
            let (lo, hi) = split(v);
            assert_eq!(join_unsigned_decimal_string(lo, hi), v.to_string());
            assert_eq!(
                join_unsigned_decimal_string(lo, hi),
                Split64::new(lo, hi).to_decimal_string()
            );
        }
    }

    #[test]
    fn test_unsigned_sweep() {
        let mut v = 0x0020_0000_0000_0000u64;
        for _ in 0..2000 {
            let (lo, hi) = split(v);
            assert_eq!(join_unsigned_decimal_string(lo, hi), v.to_string());
            v = v.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        }
    }

    #[test]
    fn test_signed() {
        let values = [0i64, 1, -1, i64::MIN, i64::MAX, -6_649_058_714_086_158_188];
        for v in values {
            let (lo, hi) = split(v as u64);
            assert_eq!(join_signed_decimal_string(lo, hi), v.to_string());
        }
    }
}
