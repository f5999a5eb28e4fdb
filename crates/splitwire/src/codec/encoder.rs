//! Byte-level accumulator for wire data.

use crate::arith::{Int64, Split64};
use crate::error::Result;
use crate::hash64::Hash64;
use crate::wire::bits::{split_float32, split_float64, zigzag_encode32, zigzag_encode64};

/// Appends primitive wire values to a growable buffer.
///
/// Value ranges are carried by the argument types, so a 16-bit write cannot
/// be handed anything but a `u16`. The `*_string` writes parse their input
/// first and fail without writing anything if it is not a valid decimal
/// number for the target width.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    /// Creates an empty encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty encoder with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written since the last [`end`](Self::end)
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing was written since the last [`end`](Self::end)
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Takes the written bytes, leaving the encoder empty
    pub fn end(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Writes a varint from split halves
    pub fn write_split_varint64(&mut self, value: Split64) {
        let Split64 { mut lo, mut hi } = value;
        while hi > 0 || lo > 0x7F {
            self.buffer.push((lo as u8 & 0x7F) | 0x80);
            lo = (lo >> 7) | (hi << 25);
            hi >>= 7;
        }
        self.buffer.push(lo as u8);
    }

    /// Writes split halves as eight little-endian bytes, low word first
    pub fn write_split_fixed64(&mut self, value: Split64) {
        self.write_uint32(value.lo);
        self.write_uint32(value.hi);
    }

    /// Writes an unsigned 32-bit varint
    pub fn write_unsigned_varint32(&mut self, value: u32) {
        self.write_unsigned_varint64(u64::from(value));
    }

    /// Writes a signed 32-bit varint. Negative values are sign-extended to
    /// 64 bits and always take ten bytes.
    pub fn write_signed_varint32(&mut self, value: i32) {
        self.write_unsigned_varint64(i64::from(value) as u64);
    }

    /// Writes an unsigned 64-bit varint
    pub fn write_unsigned_varint64(&mut self, mut value: u64) {
        while value > 0x7F {
            self.buffer.push((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    /// Writes a signed 64-bit varint
    pub fn write_signed_varint64(&mut self, value: i64) {
        self.write_unsigned_varint64(value as u64);
    }

    /// Writes a zigzag-encoded 32-bit varint
    pub fn write_zigzag_varint32(&mut self, value: i32) {
        self.write_unsigned_varint32(zigzag_encode32(value));
    }

    /// Writes a zigzag-encoded 64-bit varint
    pub fn write_zigzag_varint64(&mut self, value: i64) {
        self.write_unsigned_varint64(zigzag_encode64(value));
    }

    /// Writes a signed decimal string as a zigzag-encoded 64-bit varint
    pub fn write_zigzag_varint64_string(&mut self, value: &str) -> Result<()> {
        let parsed = Int64::from_decimal_str(value)?;
        self.write_split_varint64(parsed.as_unsigned().zigzag_encode());
        Ok(())
    }

    /// Writes a hash holding a signed value as a zigzag-encoded varint
    pub fn write_zigzag_varint_hash64(&mut self, hash: Hash64) {
        self.write_split_varint64(hash.to_split().zigzag_encode());
    }

    /// Writes one byte
    pub fn write_uint8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a little-endian 16-bit unsigned integer
    pub fn write_uint16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian 32-bit unsigned integer
    pub fn write_uint32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian 64-bit unsigned integer
    pub fn write_uint64(&mut self, value: u64) {
        self.write_split_fixed64(Split64::from_u64(value));
    }

    /// Writes an unsigned decimal string as a little-endian 64-bit integer
    pub fn write_uint64_string(&mut self, value: &str) -> Result<()> {
        let parsed = Split64::from_decimal_str(value)?;
        self.write_split_fixed64(parsed);
        Ok(())
    }

    /// Writes one byte holding a signed value
    pub fn write_int8(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    /// Writes a little-endian 16-bit signed integer
    pub fn write_int16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian 32-bit signed integer
    pub fn write_int32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian 64-bit signed integer
    pub fn write_int64(&mut self, value: i64) {
        self.write_uint64(value as u64);
    }

    /// Writes a signed decimal string as a little-endian 64-bit integer
    pub fn write_int64_string(&mut self, value: &str) -> Result<()> {
        let parsed = Int64::from_decimal_str(value)?;
        self.write_split_fixed64(parsed.as_unsigned());
        Ok(())
    }

    /// Writes an IEEE-754 binary32 value
    pub fn write_float(&mut self, value: f32) {
        self.write_uint32(split_float32(value));
    }

    /// Writes an IEEE-754 binary64 value
    pub fn write_double(&mut self, value: f64) {
        let (lo, hi) = split_float64(value);
        self.write_split_fixed64(Split64::new(lo, hi));
    }

    /// Writes a boolean as a one-byte varint
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Writes an enum value (a signed 32-bit varint)
    pub fn write_enum(&mut self, value: i32) {
        self.write_signed_varint32(value);
    }

    /// Appends raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a hash as a varint
    pub fn write_varint_hash64(&mut self, hash: Hash64) {
        self.write_split_varint64(hash.to_split());
    }

    /// Writes a hash as eight bytes
    pub fn write_fixed_hash64(&mut self, hash: Hash64) {
        self.buffer.extend_from_slice(&hash.0);
    }

    /// Appends the UTF-8 bytes of `value` and returns how many were written
    pub fn write_string(&mut self, value: &str) -> usize {
        self.buffer.extend_from_slice(value.as_bytes());
        value.len()
    }
}
