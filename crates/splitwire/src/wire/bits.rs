//! Bit-level transforms shared by the encoder and decoder.
//!
//! Zigzag maps signed integers onto unsigned ones so that values of small
//! magnitude get short varints. The float helpers assemble and disassemble
//! IEEE-754 bit patterns from sign, exponent and mantissa arithmetic, with
//! explicit branches for zero, NaN, infinity and denormals. Every NaN is
//! written as a single quiet NaN pattern.

/// Bit pattern written for any 32-bit NaN
pub const FLOAT32_NAN_BITS: u32 = 0x7FFF_FFFF;

/// Bit pattern written for any 64-bit NaN
pub const FLOAT64_NAN_BITS: u64 = 0x7FFF_FFFF_FFFF_FFFF;

const TWO_TO_23: f64 = 8_388_608.0;
const TWO_TO_52: f64 = 4_503_599_627_370_496.0;

/// Zigzag-encodes a 32-bit signed integer
pub const fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Reverses [`zigzag_encode32`]
pub const fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Zigzag-encodes a 64-bit signed integer
pub const fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Reverses [`zigzag_encode64`]
pub const fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

fn pow2(exp: i32) -> f64 {
    2f64.powi(exp)
}

/// Smallest positive 64-bit denormal, 2^-1074
fn float64_denormal_unit() -> f64 {
    f64::MIN_POSITIVE / TWO_TO_52
}

/// Finds `e` with `2^e <= value < 2^(e+1)`, clamped to `[min, max]`
fn binary_exponent(value: f64, min: i32, max: i32) -> i32 {
    let mut exp = (value.log2().floor() as i32).clamp(min, max);
    // log2 can land one off either side of an exact power of two.
    if exp > min && pow2(exp) > value {
        exp -= 1;
    }
    if exp < max && pow2(exp + 1) <= value {
        exp += 1;
    }
    exp
}

/// Converts a 32-bit float to its IEEE-754 binary32 bit pattern
pub fn split_float32(value: f32) -> u32 {
    if value.is_nan() {
        return FLOAT32_NAN_BITS;
    }

    let sign = u32::from(value.is_sign_negative()) << 31;
    let magnitude = f64::from(value.abs());

    if magnitude == 0.0 {
        return sign;
    }
    if magnitude > f64::from(f32::MAX) {
        return sign | 0x7F80_0000;
    }
    if magnitude < f64::from(f32::MIN_POSITIVE) {
        let mant = (magnitude / pow2(-149)).round() as u32;
        return sign | mant;
    }

    let exp = binary_exponent(magnitude, -126, 127);
    let fraction = magnitude / pow2(exp) - 1.0;
    let mant = ((fraction * TWO_TO_23).round() as u32) & 0x7F_FFFF;
    sign | (((exp + 127) as u32) << 23) | mant
}

/// Converts an IEEE-754 binary32 bit pattern to a 32-bit float
pub fn join_float32(bits: u32) -> f32 {
    let sign = if bits >> 31 == 1 { -1.0 } else { 1.0 };
    let exp = ((bits >> 23) & 0xFF) as i32;
    let mant = f64::from(bits & 0x7F_FFFF);

    if exp == 0xFF {
        return if mant != 0.0 {
            f32::NAN
        } else {
            (sign * f64::INFINITY) as f32
        };
    }

    let magnitude = if exp == 0 {
        mant * pow2(-149)
    } else {
        (mant + TWO_TO_23) * pow2(exp - 150)
    };
    (sign * magnitude) as f32
}

/// Converts a 64-bit float to its IEEE-754 binary64 bit pattern, returned as
/// `(lo, hi)` halves
pub fn split_float64(value: f64) -> (u32, u32) {
    if value.is_nan() {
        return (FLOAT64_NAN_BITS as u32, (FLOAT64_NAN_BITS >> 32) as u32);
    }

    let sign = u32::from(value.is_sign_negative()) << 31;
    let magnitude = value.abs();

    if magnitude == 0.0 {
        return (0, sign);
    }
    if magnitude > f64::MAX {
        return (0, sign | 0x7FF0_0000);
    }
    if magnitude < f64::MIN_POSITIVE {
        let mant = (magnitude / float64_denormal_unit()) as u64;
        return (mant as u32, sign | (mant >> 32) as u32);
    }

    let exp = binary_exponent(magnitude, -1022, 1023);
    let fraction = magnitude / pow2(exp) - 1.0;
    let mant = (fraction * TWO_TO_52) as u64;
    let hi = sign | (((exp + 1023) as u32) << 20) | ((mant >> 32) as u32 & 0xF_FFFF);
    (mant as u32, hi)
}

/// Converts IEEE-754 binary64 `(lo, hi)` halves to a 64-bit float
pub fn join_float64(lo: u32, hi: u32) -> f64 {
    let sign = if hi >> 31 == 1 { -1.0 } else { 1.0 };
    let exp = ((hi >> 20) & 0x7FF) as i32;
    let mant = ((u64::from(hi & 0xF_FFFF) << 32) | u64::from(lo)) as f64;

    if exp == 0x7FF {
        return if mant != 0.0 {
            f64::NAN
        } else {
            sign * f64::INFINITY
        };
    }

    if exp == 0 {
        sign * mant * float64_denormal_unit()
    } else {
        sign * ((mant + TWO_TO_52) / TWO_TO_52) * pow2(exp - 1023)
    }
}
