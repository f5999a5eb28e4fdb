//! Byte-level cursor over wire data.

use crate::arith::{Int64, Split64};
use crate::error::{Error, Result};
use crate::hash64::Hash64;
use crate::wire::bits::{join_float32, join_float64, zigzag_decode32, zigzag_decode64};
use crate::wire::varint_size;
use tracing::debug;

/// A cursor over a block of bytes that decodes primitive wire values.
///
/// The decoder reads between `start` and a logical `end`, which a
/// [`Reader`](crate::field::Reader) narrows while it is inside a submessage.
/// Every read is bounds-checked against that end. The first failure is kept
/// and latches the error flag, so a caller can run a whole parse pass and
/// check [`has_error`](Self::has_error) once at the end.
#[derive(Debug, Clone, Default)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    start: usize,
    end: usize,
    cursor: usize,
    error: Option<Error>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over the whole buffer
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::from_block(bytes, 0, bytes.len())
    }

    /// Creates a decoder over `bytes[start..start + length]`
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `bytes`.
    pub fn from_block(bytes: &'a [u8], start: usize, length: usize) -> Self {
        let mut decoder = Self::default();
        decoder.set_block(bytes, start, length);
        decoder
    }

    /// Points the decoder at `bytes[start..start + length]` and clears the
    /// error flag
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `bytes`.
    pub fn set_block(&mut self, bytes: &'a [u8], start: usize, length: usize) {
        let end = start
            .checked_add(length)
            .filter(|&end| end <= bytes.len())
            .unwrap_or_else(|| {
                panic!(
                    "block {start}+{length} does not fit in buffer of {} bytes",
                    bytes.len()
                )
            });
        self.bytes = bytes;
        self.start = start;
        self.end = end;
        self.cursor = start;
        self.error = None;
    }

    /// Detaches the decoder from its buffer
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The whole underlying buffer, ignoring the block bounds
    pub fn buffer(&self) -> &'a [u8] {
        self.bytes
    }

    /// Start of the block
    pub fn start(&self) -> usize {
        self.start
    }

    /// Current logical end bound
    pub fn end(&self) -> usize {
        self.end
    }

    /// Moves the logical end bound
    ///
    /// # Panics
    ///
    /// Panics if `end` lies beyond the underlying buffer.
    pub fn set_end(&mut self, end: usize) {
        assert!(
            end <= self.bytes.len(),
            "end {end} beyond buffer of {} bytes",
            self.bytes.len()
        );
        self.end = end;
    }

    /// Rewinds the cursor to the start of the block
    pub fn reset(&mut self) {
        self.cursor = self.start;
    }

    /// Current cursor position, as an index into [`buffer`](Self::buffer)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    /// Moves the cursor forward by `count` bytes without decoding them
    pub fn advance(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Returns true if the cursor sits exactly on the logical end
    pub fn at_end(&self) -> bool {
        self.cursor == self.end
    }

    /// Returns true if the cursor lies beyond the logical end
    pub fn past_end(&self) -> bool {
        self.cursor > self.end
    }

    /// Returns true once any read has failed
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The first error this decoder hit, if any
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Latches the error flag and hands the error back for propagation
    #[cold]
    pub(crate) fn fail(&mut self, err: Error) -> Error {
        if self.error.is_none() {
            debug!("Decoder failed at offset {}: {}", self.cursor, err);
            self.error = Some(err.clone());
        }
        err
    }

    fn read_byte(&mut self) -> Result<u8> {
        if self.cursor < self.end {
            if let Some(&b) = self.bytes.get(self.cursor) {
                self.cursor += 1;
                return Ok(b);
            }
        }
        Err(self.fail(Error::read_past_end(self.cursor, 1, self.end)))
    }

    /// Consumes `count` bytes that must lie within the logical end
    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.bytes;
        match self.cursor.checked_add(count) {
            Some(next) if next <= self.end && next <= bytes.len() => {
                let slice = &bytes[self.cursor..next];
                self.cursor = next;
                Ok(slice)
            }
            _ => Err(self.fail(Error::read_past_end(self.cursor, count, self.end))),
        }
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads a varint of up to 10 bytes as split halves.
    ///
    /// The fifth byte straddles the halves: its low four payload bits finish
    /// `lo` and its high three start `hi`.
    pub fn read_split_varint64(&mut self) -> Result<Split64> {
        let start = self.cursor;
        let mut lo = 0u32;
        let mut hi = 0u32;

        for i in 0..4 {
            let b = self.read_byte()?;
            lo |= u32::from(b & 0x7F) << (i * 7);
            if b < 0x80 {
                return Ok(Split64::new(lo, hi));
            }
        }

        let b = self.read_byte()?;
        lo |= u32::from(b & 0x7F) << 28;
        hi |= u32::from(b & 0x7F) >> 4;
        if b < 0x80 {
            return Ok(Split64::new(lo, hi));
        }

        for i in 0..5 {
            let b = self.read_byte()?;
            hi |= u32::from(b & 0x7F) << (i * 7 + 3);
            if b < 0x80 {
                return Ok(Split64::new(lo, hi));
            }
        }

        Err(self.fail(Error::malformed_varint(start)))
    }

    /// Reads a zigzag varint as split halves of the signed value
    pub fn read_split_zigzag_varint64(&mut self) -> Result<Int64> {
        Ok(self.read_split_varint64()?.zigzag_decode().as_signed())
    }

    /// Reads eight little-endian bytes as split halves, low word first
    pub fn read_split_fixed64(&mut self) -> Result<Split64> {
        let lo = self.read_uint32()?;
        let hi = self.read_uint32()?;
        Ok(Split64::new(lo, hi))
    }

    /// Steps over one varint without decoding it
    pub fn skip_varint(&mut self) -> Result<()> {
        let start = self.cursor;
        for _ in 0..10 {
            if self.read_byte()? < 0x80 {
                return Ok(());
            }
        }
        Err(self.fail(Error::malformed_varint(start)))
    }

    /// Steps back over the canonical varint encoding of `value`, which must
    /// be what the cursor just passed
    pub fn unskip_varint(&mut self, value: u32) {
        let size = varint_size(u64::from(value));
        self.cursor = self.cursor.saturating_sub(size).max(self.start);
    }

    /// Reads an unsigned 32-bit varint.
    ///
    /// Up to five bytes carry the value. Encodings that continue past the
    /// fifth byte are accepted only in two shapes: zero padding out to at
    /// most ten bytes, and the ten-byte sign extension that int32 writers
    /// emit for negative values. Any other bits above bit 31 are reported
    /// as a malformed varint rather than truncated.
    pub fn read_unsigned_varint32(&mut self) -> Result<u32> {
        let start = self.cursor;
        let mut value = 0u32;

        for i in 0..4 {
            let b = self.read_byte()?;
            value |= u32::from(b & 0x7F) << (i * 7);
            if b < 0x80 {
                return Ok(value);
            }
        }

        let b = self.read_byte()?;
        value |= u32::from(b & 0x0F) << 28;
        let overflow = (b >> 4) & 0x07;
        if b < 0x80 {
            if overflow != 0 {
                return Err(self.fail(Error::malformed_varint(start)));
            }
            return Ok(value);
        }

        let sign_extended = overflow == 0x07 && value & 0x8000_0000 != 0;
        if overflow != 0 && !sign_extended {
            return Err(self.fail(Error::malformed_varint(start)));
        }

        for i in 0..5 {
            let b = self.read_byte()?;
            let valid = if sign_extended {
                b == if i < 4 { 0xFF } else { 0x01 }
            } else {
                b & 0x7F == 0
            };
            if !valid {
                return Err(self.fail(Error::malformed_varint(start)));
            }
            if b < 0x80 {
                return Ok(value);
            }
        }

        Err(self.fail(Error::malformed_varint(start)))
    }

    /// Reads a signed 32-bit varint (two's complement, same bit pattern as
    /// the unsigned form)
    pub fn read_signed_varint32(&mut self) -> Result<i32> {
        Ok(self.read_unsigned_varint32()? as i32)
    }

    /// Reads an unsigned 32-bit varint as a decimal string
    pub fn read_unsigned_varint32_string(&mut self) -> Result<String> {
        Ok(self.read_unsigned_varint32()?.to_string())
    }

    /// Reads a signed 32-bit varint as a decimal string
    pub fn read_signed_varint32_string(&mut self) -> Result<String> {
        Ok(self.read_signed_varint32()?.to_string())
    }

    /// Reads a zigzag-encoded 32-bit varint
    pub fn read_zigzag_varint32(&mut self) -> Result<i32> {
        Ok(zigzag_decode32(self.read_unsigned_varint32()?))
    }

    /// Reads an unsigned 64-bit varint
    pub fn read_unsigned_varint64(&mut self) -> Result<u64> {
        Ok(self.read_split_varint64()?.to_u64())
    }

    /// Reads an unsigned 64-bit varint as a decimal string
    pub fn read_unsigned_varint64_string(&mut self) -> Result<String> {
        Ok(self.read_split_varint64()?.to_string())
    }

    /// Reads a signed 64-bit varint
    pub fn read_signed_varint64(&mut self) -> Result<i64> {
        Ok(self.read_unsigned_varint64()? as i64)
    }

    /// Reads a signed 64-bit varint as a decimal string
    pub fn read_signed_varint64_string(&mut self) -> Result<String> {
        Ok(self.read_split_varint64()?.as_signed().to_string())
    }

    /// Reads a zigzag-encoded 64-bit varint
    pub fn read_zigzag_varint64(&mut self) -> Result<i64> {
        Ok(zigzag_decode64(self.read_unsigned_varint64()?))
    }

    /// Reads a zigzag-encoded 64-bit varint as a hash of the signed value
    pub fn read_zigzag_varint_hash64(&mut self) -> Result<Hash64> {
        Ok(Hash64::from_split(self.read_split_zigzag_varint64()?.as_unsigned()))
    }

    /// Reads a zigzag-encoded 64-bit varint as a decimal string
    pub fn read_zigzag_varint64_string(&mut self) -> Result<String> {
        Ok(self.read_split_zigzag_varint64()?.to_string())
    }

    /// Reads one byte
    pub fn read_uint8(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Reads a little-endian 16-bit unsigned integer
    pub fn read_uint16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Reads a little-endian 32-bit unsigned integer
    pub fn read_uint32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Reads a little-endian 64-bit unsigned integer
    pub fn read_uint64(&mut self) -> Result<u64> {
        Ok(self.read_split_fixed64()?.to_u64())
    }

    /// Reads a little-endian 64-bit unsigned integer as a decimal string
    pub fn read_uint64_string(&mut self) -> Result<String> {
        Ok(self.read_split_fixed64()?.to_string())
    }

    /// Reads one byte as a signed integer
    pub fn read_int8(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    /// Reads a little-endian 16-bit signed integer
    pub fn read_int16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    /// Reads a little-endian 32-bit signed integer
    pub fn read_int32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Reads a little-endian 64-bit signed integer
    pub fn read_int64(&mut self) -> Result<i64> {
        Ok(self.read_uint64()? as i64)
    }

    /// Reads a little-endian 64-bit signed integer as a decimal string
    pub fn read_int64_string(&mut self) -> Result<String> {
        Ok(self.read_split_fixed64()?.as_signed().to_string())
    }

    /// Reads an IEEE-754 binary32 value
    pub fn read_float(&mut self) -> Result<f32> {
        Ok(join_float32(self.read_uint32()?))
    }

    /// Reads an IEEE-754 binary64 value
    pub fn read_double(&mut self) -> Result<f64> {
        let bits = self.read_split_fixed64()?;
        Ok(join_float64(bits.lo, bits.hi))
    }

    /// Reads a varint as a boolean; any non-zero value is true
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(!self.read_split_varint64()?.is_zero())
    }

    /// Reads an enum value (a signed 32-bit varint)
    pub fn read_enum(&mut self) -> Result<i32> {
        self.read_signed_varint32()
    }

    /// Reads `length` bytes as UTF-8 text.
    ///
    /// Valid UTF-8 is returned as-is. Otherwise the bytes are decoded
    /// leniently: stray continuation bytes are skipped, lead bytes that
    /// cannot start a sequence are dropped, sequences that encode an invalid
    /// scalar value become U+FFFD, and a sequence cut off by the end of the
    /// field ends the string.
    pub fn read_string(&mut self, length: usize) -> Result<String> {
        let bytes = self.read_bytes(length)?;
        Ok(match std::str::from_utf8(bytes) {
            Ok(s) => s.to_owned(),
            Err(_) => decode_utf8_lenient(bytes),
        })
    }

    /// Reads a varint length followed by that many bytes of UTF-8 text
    pub fn read_string_with_length(&mut self) -> Result<String> {
        let length = self.read_unsigned_varint32()?;
        self.read_string(length as usize)
    }

    /// Returns a view of the next `length` bytes without copying.
    ///
    /// A length running past the end of the whole buffer is reported as
    /// [`Error::LengthOutOfBounds`]; one that stays inside the buffer but
    /// crosses the logical end is [`Error::ReadPastEnd`].
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let in_buffer = self
            .cursor
            .checked_add(length)
            .is_some_and(|next| next <= self.bytes.len());
        if !in_buffer {
            let err = Error::length_out_of_bounds(self.cursor, length, self.bytes.len());
            return Err(self.fail(err));
        }
        self.take(length)
    }

    /// Reads a varint as a hash
    pub fn read_varint_hash64(&mut self) -> Result<Hash64> {
        Ok(Hash64::from_split(self.read_split_varint64()?))
    }

    /// Reads eight bytes as a hash
    pub fn read_fixed_hash64(&mut self) -> Result<Hash64> {
        Ok(Hash64(self.take_array()?))
    }
}

fn decode_utf8_lenient(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        i += 1;

        let (width, initial) = match c {
            0x00..=0x7F => {
                out.push(char::from(c));
                continue;
            }
            // Continuation byte out of sequence
            0x80..=0xBF => continue,
            0xC0..=0xDF => (1, u32::from(c & 0x1F)),
            0xE0..=0xEF => (2, u32::from(c & 0x0F)),
            0xF0..=0xF7 => (3, u32::from(c & 0x07)),
            _ => continue,
        };

        if i + width > bytes.len() {
            break;
        }
        let code_point = bytes[i..i + width]
            .iter()
            .fold(initial, |acc, &b| (acc << 6) | u32::from(b & 0x3F));
        i += width;
        out.push(char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    out
}
