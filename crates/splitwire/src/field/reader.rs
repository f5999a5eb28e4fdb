//! Field-tag protocol on top of [`Decoder`].

use super::{AnyValue, Message, ReaderConfig};
use crate::arith::{Int64, Split64};
use crate::codec::Decoder;
use crate::error::{Error, Result};
use crate::hash64::Hash64;
use crate::wire::{split_tag, FieldType, WireType, INVALID_FIELD_NUMBER, MAX_FIELD_NUMBER};
use tracing::trace;

/// Reads a buffer one tagged field at a time.
///
/// After [`next_field`](Self::next_field) returns `true`, the reader is
/// positioned on a field and exactly one of the typed reads, a skip, or a
/// submessage/group read should consume it. Every typed read checks the
/// field's wire type first; a mismatch is returned as
/// [`Error::WireTypeMismatch`] and latches the error flag like any other
/// decode failure.
///
/// Submessages are read by narrowing the decoder's end bound to the
/// submessage's length prefix, so a corrupt submessage cannot read into the
/// fields that follow it.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    decoder: Decoder<'a>,
    config: ReaderConfig,
    field_cursor: usize,
    field_number: u32,
    wire_type: Option<WireType>,
    open_group: Option<u32>,
    depth: u32,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the whole buffer
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::from_decoder(Decoder::new(bytes), ReaderConfig::default())
    }

    /// Creates a reader over the whole buffer with custom configuration
    pub fn with_config(bytes: &'a [u8], config: ReaderConfig) -> Self {
        Self::from_decoder(Decoder::new(bytes), config)
    }

    /// Creates a reader over an existing decoder
    pub fn from_decoder(decoder: Decoder<'a>, config: ReaderConfig) -> Self {
        Self {
            field_cursor: decoder.cursor(),
            decoder,
            config,
            field_number: INVALID_FIELD_NUMBER,
            wire_type: None,
            open_group: None,
            depth: 0,
        }
    }

    /// Points the reader at `bytes[start..start + length]` and clears all
    /// state
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `bytes`.
    pub fn set_block(&mut self, bytes: &'a [u8], start: usize, length: usize) {
        self.decoder.set_block(bytes, start, length);
        self.clear_state();
    }

    /// Rewinds to the start of the block
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.clear_state();
    }

    fn clear_state(&mut self) {
        self.field_cursor = self.decoder.cursor();
        self.field_number = INVALID_FIELD_NUMBER;
        self.wire_type = None;
        self.open_group = None;
        self.depth = 0;
    }

    /// The reader's configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// The underlying decoder
    pub fn decoder(&self) -> &Decoder<'a> {
        &self.decoder
    }

    /// The whole underlying buffer
    pub fn buffer(&self) -> &'a [u8] {
        self.decoder.buffer()
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.decoder.cursor()
    }

    /// Position of the current field's tag
    pub fn field_cursor(&self) -> usize {
        self.field_cursor
    }

    /// Number of the current field, or [`INVALID_FIELD_NUMBER`] when the
    /// reader is not on a field
    pub fn field_number(&self) -> u32 {
        self.field_number
    }

    /// Wire type of the current field
    pub fn wire_type(&self) -> Option<WireType> {
        self.wire_type
    }

    /// Returns true if the current field is length-delimited
    pub fn is_delimited(&self) -> bool {
        self.wire_type == Some(WireType::Delimited)
    }

    /// Returns true if the last tag read was an end-group tag
    pub fn is_end_group(&self) -> bool {
        self.wire_type == Some(WireType::EndGroup)
    }

    /// Returns true once any read has failed
    pub fn has_error(&self) -> bool {
        self.decoder.has_error()
    }

    /// The first error this reader hit, if any
    pub fn error(&self) -> Option<&Error> {
        self.decoder.error()
    }

    /// Moves the cursor forward by `count` bytes
    pub fn advance(&mut self, count: usize) -> Result<()> {
        self.decoder.advance(count)
    }

    fn fail(&mut self, err: Error) -> Error {
        self.decoder.fail(err)
    }

    /// Parses the next field tag.
    ///
    /// Returns `Ok(false)` at the end of the current message, and inside a
    /// group on the group's matching end tag. Fails on an invalid wire type,
    /// field number zero, an end tag that matches no open group, or a buffer
    /// that ends while a group is still open. Once the reader has failed,
    /// every later call returns [`Error::DecoderFailed`].
    pub fn next_field(&mut self) -> Result<bool> {
        if self.decoder.has_error() {
            return Err(Error::DecoderFailed);
        }

        if self.decoder.at_end() {
            self.field_number = INVALID_FIELD_NUMBER;
            self.wire_type = None;
            if let Some(field) = self.open_group {
                return Err(self.fail(Error::UnmatchedStartGroup { field }));
            }
            return Ok(false);
        }

        self.field_cursor = self.decoder.cursor();
        let header = self.decoder.read_unsigned_varint32()?;
        let (field_number, wire_bits) = split_tag(header);

        let wire_type = match WireType::try_from(wire_bits as u8) {
            Ok(wire_type) => wire_type,
            Err(_) => {
                let err = Error::invalid_wire_type(wire_bits, self.field_cursor);
                return Err(self.fail(err));
            }
        };
        if field_number == INVALID_FIELD_NUMBER {
            return Err(self.fail(Error::InvalidFieldNumber {
                number: field_number,
                max: MAX_FIELD_NUMBER,
            }));
        }

        self.field_number = field_number;
        self.wire_type = Some(wire_type);
        trace!(
            "Field {} ({:?}) at offset {}",
            field_number,
            wire_type,
            self.field_cursor
        );

        if wire_type == WireType::EndGroup {
            return match self.open_group {
                Some(open) if open == field_number => Ok(false),
                expected => Err(self.fail(Error::UnmatchedEndGroup {
                    expected,
                    found: field_number,
                })),
            };
        }
        Ok(true)
    }

    /// Winds the cursor back to the current field's tag
    pub fn unskip_header(&mut self) {
        self.decoder.set_cursor(self.field_cursor);
    }

    /// Skips the current field and every directly following field with the
    /// same number, leaving the reader just before the next different field
    pub fn skip_matching_fields(&mut self) -> Result<()> {
        let field = self.field_number;
        self.unskip_header();

        while self.next_field()? && self.field_number == field {
            self.skip_field()?;
        }

        if !self.decoder.at_end() {
            self.unskip_header();
        }
        Ok(())
    }

    fn expect_wire_type(&mut self, expected: WireType) -> Result<()> {
        if self.wire_type == Some(expected) {
            return Ok(());
        }
        let err = Error::WireTypeMismatch {
            field: self.field_number,
            expected,
            actual: self.wire_type,
        };
        Err(self.fail(err))
    }

    /// Reads a length prefix and returns the end of the payload it covers
    fn delimited_end(&mut self) -> Result<usize> {
        let length = self.decoder.read_unsigned_varint32()? as usize;
        let start = self.decoder.cursor();
        match start.checked_add(length) {
            Some(end) if end <= self.decoder.end() => Ok(end),
            _ => {
                let err = if start.saturating_add(length) > self.decoder.buffer().len() {
                    Error::length_out_of_bounds(start, length, self.decoder.buffer().len())
                } else {
                    Error::read_past_end(start, length, self.decoder.end())
                };
                Err(self.fail(err))
            }
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.recursion_limit {
            let limit = self.config.recursion_limit;
            return Err(self.fail(Error::RecursionLimitExceeded { limit }));
        }
        self.depth += 1;
        Ok(())
    }

    /// Skips the current varint field
    pub fn skip_varint_field(&mut self) -> Result<()> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.skip_varint()
    }

    /// Skips the current length-delimited field
    pub fn skip_delimited_field(&mut self) -> Result<()> {
        self.expect_wire_type(WireType::Delimited)?;
        let end = self.delimited_end()?;
        self.decoder.set_cursor(end);
        Ok(())
    }

    /// Skips the current fixed32 field
    pub fn skip_fixed32_field(&mut self) -> Result<()> {
        self.expect_wire_type(WireType::Fixed32)?;
        self.decoder.advance(4)
    }

    /// Skips the current fixed64 field
    pub fn skip_fixed64_field(&mut self) -> Result<()> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.advance(8)
    }

    /// Skips the current group, including any groups nested inside it
    pub fn skip_group(&mut self) -> Result<()> {
        let field = self.field_number;
        self.read_group_with(field, |reader| {
            while reader.next_field()? {
                reader.skip_field()?;
            }
            Ok(())
        })
    }

    /// Skips the current field, whatever its wire type
    pub fn skip_field(&mut self) -> Result<()> {
        match self.wire_type {
            Some(WireType::Varint) => self.skip_varint_field(),
            Some(WireType::Fixed64) => self.skip_fixed64_field(),
            Some(WireType::Delimited) => self.skip_delimited_field(),
            Some(WireType::Fixed32) => self.skip_fixed32_field(),
            Some(WireType::StartGroup) => self.skip_group(),
            Some(WireType::EndGroup) | None => Err(self.fail(Error::NoField)),
        }
    }

    /// Reads the current delimited field as a submessage.
    ///
    /// The decoder's end is narrowed to the submessage while `read` runs,
    /// then restored, and the cursor is placed just past the submessage
    /// whether or not `read` consumed all of it.
    pub fn read_message_with<T, F>(&mut self, read: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.expect_wire_type(WireType::Delimited)?;
        let end = self.delimited_end()?;
        self.enter()?;

        let outer_end = self.decoder.end();
        let outer_group = self.open_group.take();
        trace!(
            "Entering submessage {} at depth {} ({} bytes)",
            self.field_number,
            self.depth,
            end - self.decoder.cursor()
        );
        self.decoder.set_end(end);

        let result = read(self);

        self.decoder.set_end(outer_end);
        self.decoder.set_cursor(end);
        self.open_group = outer_group;
        self.depth -= 1;
        result
    }

    /// Reads the current delimited field into `message`
    pub fn read_message<M: Message>(&mut self, message: &mut M) -> Result<()> {
        self.read_message_with(|reader| message.merge_from(reader))
    }

    /// Reads the current group field, which must have number `field`.
    ///
    /// While `read` runs, [`next_field`](Self::next_field) returns `false`
    /// on the group's end tag. Fails with [`Error::UnterminatedGroup`] if
    /// `read` returns before that end tag was seen.
    pub fn read_group_with<T, F>(&mut self, field: u32, read: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.expect_wire_type(WireType::StartGroup)?;
        debug_assert_eq!(field, self.field_number, "group field number mismatch");
        self.enter()?;

        trace!("Entering group {} at depth {}", field, self.depth);
        let outer_group = self.open_group.replace(field);
        let result = read(self);
        self.open_group = outer_group;
        self.depth -= 1;

        let value = result?;
        if self.wire_type != Some(WireType::EndGroup) || self.field_number != field {
            return Err(self.fail(Error::UnterminatedGroup { field }));
        }
        Ok(value)
    }

    /// Reads the current group field into `message`
    pub fn read_group<M: Message>(&mut self, field: u32, message: &mut M) -> Result<()> {
        self.read_group_with(field, |reader| message.merge_from(reader))
    }

    /// Returns a standalone decoder over the current delimited field's
    /// payload and moves past it
    pub fn field_decoder(&mut self) -> Result<Decoder<'a>> {
        self.expect_wire_type(WireType::Delimited)?;
        let end = self.delimited_end()?;
        let start = self.decoder.cursor();
        self.decoder.set_cursor(end);
        Ok(Decoder::from_block(self.decoder.buffer(), start, end - start))
    }

    /// Reads one occurrence of a repeated field of the given type.
    ///
    /// Types whose elements are varints or fixed-width values are accepted
    /// both packed and unpacked, so the result holds every element of a
    /// packed field or the single value of an unpacked one.
    pub fn read_repeated_any(&mut self, field_type: FieldType) -> Result<Vec<AnyValue>> {
        let element = field_type.wire_type();
        if !element.is_packable() || !self.is_delimited() {
            return Ok(vec![self.read_any(field_type)?]);
        }

        let end = self.delimited_end()?;
        let outer_end = self.decoder.end();
        self.decoder.set_end(end);
        self.wire_type = Some(element);

        let mut values = Vec::new();
        let mut result = Ok(());
        while !self.decoder.at_end() {
            match self.read_any(field_type) {
                Ok(value) => values.push(value),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        self.wire_type = Some(WireType::Delimited);
        self.decoder.set_end(outer_end);
        result.map(|()| values)
    }

    /// Reads the current field as the given type.
    ///
    /// Messages and groups are not supported here and fail with
    /// [`Error::UnsupportedFieldType`].
    pub fn read_any(&mut self, field_type: FieldType) -> Result<AnyValue> {
        Ok(match field_type {
            FieldType::Double => AnyValue::F64(self.read_double()?),
            FieldType::Float => AnyValue::F32(self.read_float()?),
            FieldType::Int64 => AnyValue::I64(self.read_int64()?),
            FieldType::Uint64 => AnyValue::U64(self.read_uint64()?),
            FieldType::Int32 => AnyValue::I32(self.read_int32()?),
            FieldType::Fixed64 => AnyValue::U64(self.read_fixed64()?),
            FieldType::Fixed32 => AnyValue::U32(self.read_fixed32()?),
            FieldType::Bool => AnyValue::Bool(self.read_bool()?),
            FieldType::String => AnyValue::String(self.read_string()?),
            FieldType::Bytes => AnyValue::Bytes(self.read_bytes()?.to_vec()),
            FieldType::Uint32 => AnyValue::U32(self.read_uint32()?),
            FieldType::Enum => AnyValue::I32(self.read_enum()?),
            FieldType::Sfixed32 => AnyValue::I32(self.read_sfixed32()?),
            FieldType::Sfixed64 => AnyValue::I64(self.read_sfixed64()?),
            FieldType::Sint32 => AnyValue::I32(self.read_sint32()?),
            FieldType::Sint64 => AnyValue::I64(self.read_sint64()?),
            FieldType::Fhash64 => AnyValue::Hash64(self.read_fixed_hash64()?),
            FieldType::Vhash64 => AnyValue::Hash64(self.read_varint_hash64()?),
            FieldType::Group | FieldType::Message => {
                return Err(Error::UnsupportedFieldType(field_type))
            }
        })
    }

    /// Reads an `int32` field
    pub fn read_int32(&mut self) -> Result<i32> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_signed_varint32()
    }

    /// Reads an `int32` field as a decimal string
    pub fn read_int32_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_signed_varint32_string()
    }

    /// Reads an `int64` field
    pub fn read_int64(&mut self) -> Result<i64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_signed_varint64()
    }

    /// Reads an `int64` field as a decimal string
    pub fn read_int64_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_signed_varint64_string()
    }

    /// Reads a `uint32` field
    pub fn read_uint32(&mut self) -> Result<u32> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_unsigned_varint32()
    }

    /// Reads a `uint32` field as a decimal string
    pub fn read_uint32_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_unsigned_varint32_string()
    }

    /// Reads a `uint64` field
    pub fn read_uint64(&mut self) -> Result<u64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_unsigned_varint64()
    }

    /// Reads a `uint64` field as a decimal string
    pub fn read_uint64_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_unsigned_varint64_string()
    }

    /// Reads a `sint32` field
    pub fn read_sint32(&mut self) -> Result<i32> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_zigzag_varint32()
    }

    /// Reads a `sint64` field
    pub fn read_sint64(&mut self) -> Result<i64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_zigzag_varint64()
    }

    /// Reads a `sint64` field as a decimal string
    pub fn read_sint64_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_zigzag_varint64_string()
    }

    /// Reads a `fixed32` field
    pub fn read_fixed32(&mut self) -> Result<u32> {
        self.expect_wire_type(WireType::Fixed32)?;
        self.decoder.read_uint32()
    }

    /// Reads a `fixed64` field
    pub fn read_fixed64(&mut self) -> Result<u64> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_uint64()
    }

    /// Reads a `fixed64` field as a decimal string
    pub fn read_fixed64_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_uint64_string()
    }

    /// Reads an `sfixed32` field
    pub fn read_sfixed32(&mut self) -> Result<i32> {
        self.expect_wire_type(WireType::Fixed32)?;
        self.decoder.read_int32()
    }

    /// Reads an `sfixed32` field as a decimal string
    pub fn read_sfixed32_string(&mut self) -> Result<String> {
        Ok(self.read_sfixed32()?.to_string())
    }

    /// Reads an `sfixed64` field
    pub fn read_sfixed64(&mut self) -> Result<i64> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_int64()
    }

    /// Reads an `sfixed64` field as a decimal string
    pub fn read_sfixed64_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_int64_string()
    }

    /// Reads a `float` field
    pub fn read_float(&mut self) -> Result<f32> {
        self.expect_wire_type(WireType::Fixed32)?;
        self.decoder.read_float()
    }

    /// Reads a `double` field
    pub fn read_double(&mut self) -> Result<f64> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_double()
    }

    /// Reads a `bool` field
    pub fn read_bool(&mut self) -> Result<bool> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_bool()
    }

    /// Reads an enum field
    pub fn read_enum(&mut self) -> Result<i32> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_enum()
    }

    /// Reads a `string` field
    pub fn read_string(&mut self) -> Result<String> {
        self.expect_wire_type(WireType::Delimited)?;
        let end = self.delimited_end()?;
        let length = end - self.decoder.cursor();
        self.decoder.read_string(length)
    }

    /// Reads a `bytes` field as a view into the buffer
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        self.expect_wire_type(WireType::Delimited)?;
        let end = self.delimited_end()?;
        let length = end - self.decoder.cursor();
        self.decoder.read_bytes(length)
    }

    /// Reads a varint field as a hash
    pub fn read_varint_hash64(&mut self) -> Result<Hash64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_varint_hash64()
    }

    /// Reads a zigzag varint field as a hash of the signed value
    pub fn read_sint_hash64(&mut self) -> Result<Hash64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_zigzag_varint_hash64()
    }

    /// Reads a fixed64 field as a hash
    pub fn read_fixed_hash64(&mut self) -> Result<Hash64> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_fixed_hash64()
    }

    /// Reads a varint field as split halves
    pub fn read_split_varint64(&mut self) -> Result<Split64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_split_varint64()
    }

    /// Reads a zigzag varint field as split halves of the signed value
    pub fn read_split_zigzag_varint64(&mut self) -> Result<Int64> {
        self.expect_wire_type(WireType::Varint)?;
        self.decoder.read_split_zigzag_varint64()
    }

    /// Reads a fixed64 field as split halves
    pub fn read_split_fixed64(&mut self) -> Result<Split64> {
        self.expect_wire_type(WireType::Fixed64)?;
        self.decoder.read_split_fixed64()
    }

    /// Reads a packed field by decoding elements with `read` until the
    /// payload is used up. Elements cannot run past the payload.
    fn read_packed<T, F>(&mut self, mut read: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Decoder<'a>) -> Result<T>,
    {
        self.expect_wire_type(WireType::Delimited)?;
        let end = self.delimited_end()?;
        let outer_end = self.decoder.end();
        self.decoder.set_end(end);

        let mut values = Vec::new();
        let mut result = Ok(());
        while !self.decoder.at_end() {
            match read(&mut self.decoder) {
                Ok(value) => values.push(value),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        self.decoder.set_end(outer_end);
        result.map(|()| values)
    }

    /// Reads a packed `int32` field
    pub fn read_packed_int32(&mut self) -> Result<Vec<i32>> {
        self.read_packed(Decoder::read_signed_varint32)
    }

    /// Reads a packed `int32` field as decimal strings
    pub fn read_packed_int32_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_signed_varint32_string)
    }

    /// Reads a packed `int64` field
    pub fn read_packed_int64(&mut self) -> Result<Vec<i64>> {
        self.read_packed(Decoder::read_signed_varint64)
    }

    /// Reads a packed `int64` field as decimal strings
    pub fn read_packed_int64_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_signed_varint64_string)
    }

    /// Reads a packed `uint32` field
    pub fn read_packed_uint32(&mut self) -> Result<Vec<u32>> {
        self.read_packed(Decoder::read_unsigned_varint32)
    }

    /// Reads a packed `uint32` field as decimal strings
    pub fn read_packed_uint32_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_unsigned_varint32_string)
    }

    /// Reads a packed `uint64` field
    pub fn read_packed_uint64(&mut self) -> Result<Vec<u64>> {
        self.read_packed(Decoder::read_unsigned_varint64)
    }

    /// Reads a packed `uint64` field as decimal strings
    pub fn read_packed_uint64_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_unsigned_varint64_string)
    }

    /// Reads a packed `sint32` field
    pub fn read_packed_sint32(&mut self) -> Result<Vec<i32>> {
        self.read_packed(Decoder::read_zigzag_varint32)
    }

    /// Reads a packed `sint64` field
    pub fn read_packed_sint64(&mut self) -> Result<Vec<i64>> {
        self.read_packed(Decoder::read_zigzag_varint64)
    }

    /// Reads a packed `sint64` field as decimal strings
    pub fn read_packed_sint64_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_zigzag_varint64_string)
    }

    /// Reads a packed `fixed32` field
    pub fn read_packed_fixed32(&mut self) -> Result<Vec<u32>> {
        self.read_packed(Decoder::read_uint32)
    }

    /// Reads a packed `fixed64` field
    pub fn read_packed_fixed64(&mut self) -> Result<Vec<u64>> {
        self.read_packed(Decoder::read_uint64)
    }

    /// Reads a packed `fixed64` field as decimal strings
    pub fn read_packed_fixed64_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_uint64_string)
    }

    /// Reads a packed `sfixed32` field
    pub fn read_packed_sfixed32(&mut self) -> Result<Vec<i32>> {
        self.read_packed(Decoder::read_int32)
    }

    /// Reads a packed `sfixed64` field
    pub fn read_packed_sfixed64(&mut self) -> Result<Vec<i64>> {
        self.read_packed(Decoder::read_int64)
    }

    /// Reads a packed `sfixed64` field as decimal strings
    pub fn read_packed_sfixed64_string(&mut self) -> Result<Vec<String>> {
        self.read_packed(Decoder::read_int64_string)
    }

    /// Reads a packed `float` field
    pub fn read_packed_float(&mut self) -> Result<Vec<f32>> {
        self.read_packed(Decoder::read_float)
    }

    /// Reads a packed `double` field
    pub fn read_packed_double(&mut self) -> Result<Vec<f64>> {
        self.read_packed(Decoder::read_double)
    }

    /// Reads a packed `bool` field
    pub fn read_packed_bool(&mut self) -> Result<Vec<bool>> {
        self.read_packed(Decoder::read_bool)
    }

    /// Reads a packed enum field
    pub fn read_packed_enum(&mut self) -> Result<Vec<i32>> {
        self.read_packed(Decoder::read_enum)
    }

    /// Reads a packed varint field as hashes
    pub fn read_packed_varint_hash64(&mut self) -> Result<Vec<Hash64>> {
        self.read_packed(Decoder::read_varint_hash64)
    }

    /// Reads a packed fixed64 field as hashes
    pub fn read_packed_fixed_hash64(&mut self) -> Result<Vec<Hash64>> {
        self.read_packed(Decoder::read_fixed_hash64)
    }
}
