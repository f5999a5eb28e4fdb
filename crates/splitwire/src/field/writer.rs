//! Field-tag protocol on top of [`Encoder`], with deferred length framing.

use super::{AnyValue, Message};
use crate::arith::{Int64, Split64};
use crate::codec::Encoder;
use crate::error::{Error, Result};
use crate::hash64::Hash64;
use crate::wire::{is_valid_field_number, make_tag, varint_size, FieldType, WireType};
use bytes::{Bytes, BytesMut};
use tracing::trace;

/// A finished chunk of output
#[derive(Debug, Clone)]
enum Block {
    Owned(Vec<u8>),
    Shared(Bytes),
}

impl Block {
    fn as_slice(&self) -> &[u8] {
        match self {
            Block::Owned(bytes) => &bytes[..],
            Block::Shared(bytes) => &bytes[..],
        }
    }

    fn extend_from_slice(&mut self, data: &[u8]) {
        match self {
            Block::Owned(bytes) => bytes.extend_from_slice(data),
            Block::Shared(bytes) => {
                let mut owned = bytes.to_vec();
                owned.extend_from_slice(data);
                *self = Block::Owned(owned);
            }
        }
    }
}

/// An unterminated length-delimited field opened by
/// [`Writer::begin_delimited`].
///
/// Records which block the length prefix goes into and how much output
/// existed when the field body started.
#[derive(Debug)]
#[must_use = "a bookmark must be passed to Writer::end_delimited"]
pub struct Bookmark {
    block: usize,
    length: usize,
}

/// Serializes tagged fields into a byte buffer.
///
/// Output accumulates as a list of finished blocks plus the encoder's
/// in-progress bytes. A length-delimited field is written in two steps:
/// [`begin_delimited`](Self::begin_delimited) writes the tag and closes the
/// current block, and [`end_delimited`](Self::end_delimited) appends the
/// now-known length to that block. Nothing is copied until
/// [`result_buffer`](Self::result_buffer) concatenates the blocks.
///
/// Field numbers outside `1..=MAX_FIELD_NUMBER`, and bookmarks closed out
/// of order, are caller bugs and panic.
#[derive(Debug, Default)]
pub struct Writer {
    blocks: Vec<Block>,
    total_length: usize,
    encoder: Encoder,
    open: Vec<usize>,
    sub_messages: Vec<Bookmark>,
}

macro_rules! repeated {
    ($($name:ident => $single:ident($ty:ty);)*) => {
        $(
            #[doc = concat!(
                "Writes each value as its own field, as [`",
                stringify!($single),
                "`](Self::",
                stringify!($single),
                ") would"
            )]
            pub fn $name(&mut self, field: u32, values: &[$ty]) {
                for &value in values {
                    self.$single(field, value);
                }
            }
        )*
    };
}

macro_rules! packed_varint {
    ($($name:ident => $write:ident($ty:ty);)*) => {
        $(
            #[doc = concat!(
                "Writes a packed field of `",
                stringify!($ty),
                "` varints. Nothing is written for an empty slice."
            )]
            pub fn $name(&mut self, field: u32, values: &[$ty]) {
                if values.is_empty() {
                    return;
                }
                let bookmark = self.begin_delimited(field);
                for &value in values {
                    self.encoder.$write(value);
                }
                self.end_delimited(bookmark);
            }
        )*
    };
}

macro_rules! packed_fixed {
    ($($name:ident => $write:ident($ty:ty, $width:expr);)*) => {
        $(
            #[doc = concat!(
                "Writes a packed field of ",
                stringify!($width),
                "-byte `",
                stringify!($ty),
                "` values. Nothing is written for an empty slice."
            )]
            pub fn $name(&mut self, field: u32, values: &[$ty]) {
                if values.is_empty() {
                    return;
                }
                self.write_field_header(field, WireType::Delimited);
                self.encoder.write_unsigned_varint64((values.len() * $width) as u64);
                for &value in values {
                    self.encoder.$write(value);
                }
            }
        )*
    };
}

impl Writer {
    /// Creates an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all output and open bookmarks
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of bytes written so far, not counting the length prefixes of
    /// fields that are still open
    pub fn len(&self) -> usize {
        self.total_length + self.encoder.len()
    }

    /// Returns true if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flush(&mut self) {
        if !self.encoder.is_empty() {
            let block = self.encoder.end();
            self.total_length += block.len();
            self.blocks.push(Block::Owned(block));
        }
    }

    /// Concatenates everything written so far into one buffer.
    ///
    /// The blocks are merged once; calling this again without writing more
    /// returns the same buffer without copying. The writer stays usable and
    /// later writes are appended after the returned data.
    ///
    /// # Panics
    ///
    /// Panics if a delimited field is still open.
    pub fn result_buffer(&mut self) -> Bytes {
        assert!(
            self.open.is_empty(),
            "{} delimited field(s) still open",
            self.open.len()
        );
        self.flush();

        if let [Block::Shared(bytes)] = self.blocks.as_slice() {
            return bytes.clone();
        }

        let mut buffer = BytesMut::with_capacity(self.total_length);
        for block in &self.blocks {
            buffer.extend_from_slice(block.as_slice());
        }
        let bytes = buffer.freeze();
        trace!(
            "Flattened {} blocks into {} bytes",
            self.blocks.len(),
            bytes.len()
        );
        self.blocks = vec![Block::Shared(bytes.clone())];
        bytes
    }

    /// Writes a field tag
    ///
    /// # Panics
    ///
    /// Panics if `field` is not a valid field number.
    pub fn write_field_header(&mut self, field: u32, wire_type: WireType) {
        assert!(is_valid_field_number(field), "invalid field number {field}");
        self.encoder.write_unsigned_varint32(make_tag(field, wire_type));
    }

    /// Writes the tag of a length-delimited field and opens its body.
    ///
    /// Every bookmark must be handed back to
    /// [`end_delimited`](Self::end_delimited) in reverse order of creation.
    pub fn begin_delimited(&mut self, field: u32) -> Bookmark {
        self.write_field_header(field, WireType::Delimited);
        self.flush();
        let block = self.blocks.len() - 1;
        self.open.push(block);
        Bookmark {
            block,
            length: self.total_length,
        }
    }

    /// Closes a delimited field by appending its length prefix to the
    /// bookmarked block
    ///
    /// # Panics
    ///
    /// Panics if `bookmark` is not the most recently opened one.
    pub fn end_delimited(&mut self, bookmark: Bookmark) {
        assert_eq!(
            self.open.last(),
            Some(&bookmark.block),
            "delimited fields must be closed in reverse order"
        );
        self.open.pop();

        let length = self.total_length + self.encoder.len() - bookmark.length;
        let mut prefix = Encoder::with_capacity(varint_size(length as u64));
        prefix.write_unsigned_varint64(length as u64);
        self.blocks[bookmark.block].extend_from_slice(prefix.as_slice());
        self.total_length += prefix.len();
        trace!("Closed delimited field with {} byte body", length);
    }

    /// Opens a delimited field whose bookmark the writer keeps itself
    pub fn begin_sub_message(&mut self, field: u32) {
        let bookmark = self.begin_delimited(field);
        self.sub_messages.push(bookmark);
    }

    /// Closes the field opened by the last
    /// [`begin_sub_message`](Self::begin_sub_message)
    ///
    /// # Panics
    ///
    /// Panics if no submessage is open, or if a bookmark opened after it
    /// is still open.
    pub fn end_sub_message(&mut self) {
        match self.sub_messages.pop() {
            Some(bookmark) => self.end_delimited(bookmark),
            None => panic!("end_sub_message called with no open submessage"),
        }
    }

    /// Appends already-serialized message bytes verbatim
    pub fn write_serialized_message(&mut self, bytes: &[u8]) {
        self.encoder.write_bytes(bytes);
    }

    /// Writes a submessage field
    pub fn write_message<M: Message + ?Sized>(&mut self, field: u32, message: &M) {
        let bookmark = self.begin_delimited(field);
        message.write_to(self);
        self.end_delimited(bookmark);
    }

    /// Writes a submessage field whose body is produced by `write`
    pub fn write_message_with<T, F>(&mut self, field: u32, write: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let bookmark = self.begin_delimited(field);
        let value = write(self);
        self.end_delimited(bookmark);
        value
    }

    /// Writes a group field
    pub fn write_group<M: Message + ?Sized>(&mut self, field: u32, message: &M) {
        self.write_field_header(field, WireType::StartGroup);
        message.write_to(self);
        self.write_field_header(field, WireType::EndGroup);
    }

    /// Writes a group field whose body is produced by `write`
    pub fn write_group_with<T, F>(&mut self, field: u32, write: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.write_field_header(field, WireType::StartGroup);
        let value = write(self);
        self.write_field_header(field, WireType::EndGroup);
        value
    }

    /// Writes an `int32` field
    pub fn write_int32(&mut self, field: u32, value: i32) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_signed_varint32(value);
    }

    /// Writes an `int32` field given as a decimal string
    pub fn write_int32_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = i32::try_from(Int64::from_decimal_str(value)?.to_i64())
            .map_err(|_| Error::invalid_decimal(value))?;
        self.write_int32(field, parsed);
        Ok(())
    }

    /// Writes an `int64` field
    pub fn write_int64(&mut self, field: u32, value: i64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_signed_varint64(value);
    }

    /// Writes an `int64` field given as a decimal string
    pub fn write_int64_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = Int64::from_decimal_str(value)?;
        self.write_split_varint64(field, parsed.as_unsigned());
        Ok(())
    }

    /// Writes a `uint32` field
    pub fn write_uint32(&mut self, field: u32, value: u32) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_unsigned_varint32(value);
    }

    /// Writes a `uint32` field given as a decimal string
    pub fn write_uint32_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = Split64::from_decimal_str(value)?;
        if parsed.hi != 0 {
            return Err(Error::invalid_decimal(value));
        }
        let parsed = parsed.lo;
        self.write_uint32(field, parsed);
        Ok(())
    }

    /// Writes a `uint64` field
    pub fn write_uint64(&mut self, field: u32, value: u64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_unsigned_varint64(value);
    }

    /// Writes a `uint64` field given as a decimal string
    pub fn write_uint64_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = Split64::from_decimal_str(value)?;
        self.write_split_varint64(field, parsed);
        Ok(())
    }

    /// Writes a `sint32` field
    pub fn write_sint32(&mut self, field: u32, value: i32) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_zigzag_varint32(value);
    }

    /// Writes a `sint64` field
    pub fn write_sint64(&mut self, field: u32, value: i64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_zigzag_varint64(value);
    }

    /// Writes a `sint64` field given as a decimal string
    pub fn write_sint64_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = Int64::from_decimal_str(value)?;
        self.write_split_zigzag_varint64(field, parsed);
        Ok(())
    }

    /// Writes a `fixed32` field
    pub fn write_fixed32(&mut self, field: u32, value: u32) {
        self.write_field_header(field, WireType::Fixed32);
        self.encoder.write_uint32(value);
    }

    /// Writes a `fixed64` field
    pub fn write_fixed64(&mut self, field: u32, value: u64) {
        self.write_field_header(field, WireType::Fixed64);
        self.encoder.write_uint64(value);
    }

    /// Writes a `fixed64` field given as a decimal string
    pub fn write_fixed64_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = Split64::from_decimal_str(value)?;
        self.write_split_fixed64(field, parsed);
        Ok(())
    }

    /// Writes an `sfixed32` field
    pub fn write_sfixed32(&mut self, field: u32, value: i32) {
        self.write_field_header(field, WireType::Fixed32);
        self.encoder.write_int32(value);
    }

    /// Writes an `sfixed64` field
    pub fn write_sfixed64(&mut self, field: u32, value: i64) {
        self.write_field_header(field, WireType::Fixed64);
        self.encoder.write_int64(value);
    }

    /// Writes an `sfixed64` field given as a decimal string
    pub fn write_sfixed64_string(&mut self, field: u32, value: &str) -> Result<()> {
        let parsed = Int64::from_decimal_str(value)?;
        self.write_split_fixed64(field, parsed.as_unsigned());
        Ok(())
    }

    /// Writes a `float` field
    pub fn write_float(&mut self, field: u32, value: f32) {
        self.write_field_header(field, WireType::Fixed32);
        self.encoder.write_float(value);
    }

    /// Writes a `double` field
    pub fn write_double(&mut self, field: u32, value: f64) {
        self.write_field_header(field, WireType::Fixed64);
        self.encoder.write_double(value);
    }

    /// Writes a `bool` field
    pub fn write_bool(&mut self, field: u32, value: bool) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_bool(value);
    }

    /// Writes an enum field
    pub fn write_enum(&mut self, field: u32, value: i32) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_enum(value);
    }

    /// Writes a `string` field
    pub fn write_string(&mut self, field: u32, value: &str) {
        self.write_field_header(field, WireType::Delimited);
        self.encoder.write_unsigned_varint64(value.len() as u64);
        self.encoder.write_string(value);
    }

    /// Writes a `bytes` field
    pub fn write_bytes(&mut self, field: u32, value: &[u8]) {
        self.write_field_header(field, WireType::Delimited);
        self.encoder.write_unsigned_varint64(value.len() as u64);
        self.encoder.write_bytes(value);
    }

    /// Writes a `bytes` field, keeping a reference to `value` instead of
    /// copying it until [`result_buffer`](Self::result_buffer)
    pub fn write_bytes_shared(&mut self, field: u32, value: Bytes) {
        self.write_field_header(field, WireType::Delimited);
        self.encoder.write_unsigned_varint64(value.len() as u64);
        self.flush();
        self.total_length += value.len();
        self.blocks.push(Block::Shared(value));
    }

    /// Writes a hash as a varint field
    pub fn write_varint_hash64(&mut self, field: u32, hash: Hash64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_varint_hash64(hash);
    }

    /// Writes a hash holding a signed value as a zigzag varint field
    pub fn write_sint_hash64(&mut self, field: u32, hash: Hash64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_zigzag_varint_hash64(hash);
    }

    /// Writes a hash as a fixed64 field
    pub fn write_fixed_hash64(&mut self, field: u32, hash: Hash64) {
        self.write_field_header(field, WireType::Fixed64);
        self.encoder.write_fixed_hash64(hash);
    }

    /// Writes split halves as a varint field
    pub fn write_split_varint64(&mut self, field: u32, value: Split64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder.write_split_varint64(value);
    }

    /// Writes a signed value held in split halves as a zigzag varint field
    pub fn write_split_zigzag_varint64(&mut self, field: u32, value: Int64) {
        self.write_field_header(field, WireType::Varint);
        self.encoder
            .write_split_varint64(value.as_unsigned().zigzag_encode());
    }

    /// Writes split halves as a fixed64 field
    pub fn write_split_fixed64(&mut self, field: u32, value: Split64) {
        self.write_field_header(field, WireType::Fixed64);
        self.encoder.write_split_fixed64(value);
    }

    repeated! {
        write_repeated_int32 => write_int32(i32);
        write_repeated_int64 => write_int64(i64);
        write_repeated_uint32 => write_uint32(u32);
        write_repeated_uint64 => write_uint64(u64);
        write_repeated_sint32 => write_sint32(i32);
        write_repeated_sint64 => write_sint64(i64);
        write_repeated_fixed32 => write_fixed32(u32);
        write_repeated_fixed64 => write_fixed64(u64);
        write_repeated_sfixed32 => write_sfixed32(i32);
        write_repeated_sfixed64 => write_sfixed64(i64);
        write_repeated_float => write_float(f32);
        write_repeated_double => write_double(f64);
        write_repeated_bool => write_bool(bool);
        write_repeated_enum => write_enum(i32);
        write_repeated_varint_hash64 => write_varint_hash64(Hash64);
        write_repeated_fixed_hash64 => write_fixed_hash64(Hash64);
    }

    /// Writes each value as its own decimal-string field through `write`,
    /// after checking that every value parses
    fn write_repeated_parsed<T, P, W>(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
        parse: P,
        mut write: W,
    ) -> Result<()>
    where
        P: Fn(&str) -> Result<T>,
        W: FnMut(&mut Self, u32, T),
    {
        let parsed = values
            .iter()
            .map(|value| parse(value.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for value in parsed {
            write(self, field, value);
        }
        Ok(())
    }

    /// Writes each decimal string as its own `int64` field. Nothing is
    /// written if any value fails to parse.
    pub fn write_repeated_int64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_repeated_parsed(field, values, Int64::from_decimal_str, |w, f, v| {
            w.write_split_varint64(f, v.as_unsigned())
        })
    }

    /// Writes each decimal string as its own `uint64` field. Nothing is
    /// written if any value fails to parse.
    pub fn write_repeated_uint64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_repeated_parsed(
            field,
            values,
            Split64::from_decimal_str,
            Self::write_split_varint64,
        )
    }

    /// Writes each decimal string as its own `sint64` field. Nothing is
    /// written if any value fails to parse.
    pub fn write_repeated_sint64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_repeated_parsed(
            field,
            values,
            Int64::from_decimal_str,
            Self::write_split_zigzag_varint64,
        )
    }

    /// Writes each decimal string as its own `fixed64` field. Nothing is
    /// written if any value fails to parse.
    pub fn write_repeated_fixed64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_repeated_parsed(
            field,
            values,
            Split64::from_decimal_str,
            Self::write_split_fixed64,
        )
    }

    /// Writes each decimal string as its own `sfixed64` field. Nothing is
    /// written if any value fails to parse.
    pub fn write_repeated_sfixed64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_repeated_parsed(field, values, Int64::from_decimal_str, |w, f, v| {
            w.write_split_fixed64(f, v.as_unsigned())
        })
    }

    /// Writes each value as its own `string` field
    pub fn write_repeated_string(&mut self, field: u32, values: &[impl AsRef<str>]) {
        for value in values {
            self.write_string(field, value.as_ref());
        }
    }

    /// Writes each value as its own `bytes` field
    pub fn write_repeated_bytes(&mut self, field: u32, values: &[impl AsRef<[u8]>]) {
        for value in values {
            self.write_bytes(field, value.as_ref());
        }
    }

    /// Writes each message as its own submessage field
    pub fn write_repeated_message<M: Message>(&mut self, field: u32, messages: &[M]) {
        for message in messages {
            self.write_message(field, message);
        }
    }

    /// Writes each message as its own group field
    pub fn write_repeated_group<M: Message>(&mut self, field: u32, messages: &[M]) {
        for message in messages {
            self.write_group(field, message);
        }
    }

    packed_varint! {
        write_packed_int32 => write_signed_varint32(i32);
        write_packed_int64 => write_signed_varint64(i64);
        write_packed_uint32 => write_unsigned_varint32(u32);
        write_packed_uint64 => write_unsigned_varint64(u64);
        write_packed_sint32 => write_zigzag_varint32(i32);
        write_packed_sint64 => write_zigzag_varint64(i64);
        write_packed_bool => write_bool(bool);
        write_packed_enum => write_enum(i32);
        write_packed_varint_hash64 => write_varint_hash64(Hash64);
    }

    packed_fixed! {
        write_packed_fixed32 => write_uint32(u32, 4);
        write_packed_fixed64 => write_uint64(u64, 8);
        write_packed_sfixed32 => write_int32(i32, 4);
        write_packed_sfixed64 => write_int64(i64, 8);
        write_packed_float => write_float(f32, 4);
        write_packed_double => write_double(f64, 8);
        write_packed_fixed_hash64 => write_fixed_hash64(Hash64, 8);
    }

    /// Parses every decimal string, then writes them as one packed field
    /// through `write`
    fn write_packed_parsed<T, P, W>(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
        parse: P,
        write: W,
    ) -> Result<()>
    where
        P: Fn(&str) -> Result<T>,
        W: Fn(&mut Encoder, T),
    {
        let parsed = values
            .iter()
            .map(|value| parse(value.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if parsed.is_empty() {
            return Ok(());
        }
        let bookmark = self.begin_delimited(field);
        for value in parsed {
            write(&mut self.encoder, value);
        }
        self.end_delimited(bookmark);
        Ok(())
    }

    /// Writes decimal strings as a packed `int64` field
    pub fn write_packed_int64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_packed_parsed(field, values, Int64::from_decimal_str, |e, v| {
            e.write_split_varint64(v.as_unsigned())
        })
    }

    /// Writes decimal strings as a packed `uint64` field
    pub fn write_packed_uint64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_packed_parsed(
            field,
            values,
            Split64::from_decimal_str,
            Encoder::write_split_varint64,
        )
    }

    /// Writes decimal strings as a packed `sint64` field
    pub fn write_packed_sint64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_packed_parsed(field, values, Int64::from_decimal_str, |e, v| {
            e.write_split_varint64(v.as_unsigned().zigzag_encode())
        })
    }

    /// Writes decimal strings as a packed `fixed64` field
    pub fn write_packed_fixed64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_packed_parsed(
            field,
            values,
            Split64::from_decimal_str,
            Encoder::write_split_fixed64,
        )
    }

    /// Writes decimal strings as a packed `sfixed64` field
    pub fn write_packed_sfixed64_string(
        &mut self,
        field: u32,
        values: &[impl AsRef<str>],
    ) -> Result<()> {
        self.write_packed_parsed(field, values, Int64::from_decimal_str, |e, v| {
            e.write_split_fixed64(v.as_unsigned())
        })
    }

    /// Writes a single value as a field of the given type.
    ///
    /// Fails with [`Error::ValueTypeMismatch`] if `value` cannot represent
    /// `field_type`, and with [`Error::UnsupportedFieldType`] for messages
    /// and groups.
    pub fn write_any(&mut self, field_type: FieldType, field: u32, value: &AnyValue) -> Result<()> {
        match (field_type, value) {
            (FieldType::Double, AnyValue::F64(v)) => self.write_double(field, *v),
            (FieldType::Float, AnyValue::F32(v)) => self.write_float(field, *v),
            (FieldType::Int64, AnyValue::I64(v)) => self.write_int64(field, *v),
            (FieldType::Uint64, AnyValue::U64(v)) => self.write_uint64(field, *v),
            (FieldType::Int32, AnyValue::I32(v)) => self.write_int32(field, *v),
            (FieldType::Fixed64, AnyValue::U64(v)) => self.write_fixed64(field, *v),
            (FieldType::Fixed32, AnyValue::U32(v)) => self.write_fixed32(field, *v),
            (FieldType::Bool, AnyValue::Bool(v)) => self.write_bool(field, *v),
            (FieldType::String, AnyValue::String(v)) => self.write_string(field, v),
            (FieldType::Bytes, AnyValue::Bytes(v)) => self.write_bytes(field, v),
            (FieldType::Uint32, AnyValue::U32(v)) => self.write_uint32(field, *v),
            (FieldType::Enum, AnyValue::I32(v)) => self.write_enum(field, *v),
            (FieldType::Sfixed32, AnyValue::I32(v)) => self.write_sfixed32(field, *v),
            (FieldType::Sfixed64, AnyValue::I64(v)) => self.write_sfixed64(field, *v),
            (FieldType::Sint32, AnyValue::I32(v)) => self.write_sint32(field, *v),
            (FieldType::Sint64, AnyValue::I64(v)) => self.write_sint64(field, *v),
            (FieldType::Fhash64, AnyValue::Hash64(v)) => self.write_fixed_hash64(field, *v),
            (FieldType::Vhash64, AnyValue::Hash64(v)) => self.write_varint_hash64(field, *v),
            (FieldType::Group | FieldType::Message, _) => {
                return Err(Error::UnsupportedFieldType(field_type))
            }
            _ => return Err(Error::ValueTypeMismatch { field_type }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Reader;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_fields() {
        let mut writer = Writer::new();
        writer.write_uint32(1, 100);
        writer.write_string(2, "Hello world");
        writer.write_bytes(3, &[1, 2, 3]);
        writer.write_uint32(4, 200);
        assert_eq!(
            &writer.result_buffer()[..],
            &[
                0x08, 0x64, 0x12, 0x0b, 0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x77, 0x6f, 0x72,
                0x6c, 0x64, 0x1a, 0x03, 0x01, 0x02, 0x03, 0x20, 0xc8, 0x01,
            ]
        );
    }

    #[test]
    fn test_nested_framing() {
        let blob = vec![0xAB; 300];

        let mut writer = Writer::new();
        writer.write_message_with(1, |outer| {
            outer.write_message_with(2, |inner| inner.write_bytes(3, &blob));
        });
        let bytes = writer.result_buffer();

        // blob (300) + tag (1) + two-byte length = 303 for the innermost
        // field, wrapped twice more with a one-byte tag and two-byte length
        assert_eq!(bytes.len(), 300 + 3 * 3);

        let mut reader = Reader::new(&bytes);
        assert!(reader.next_field().unwrap());
        let payload = reader
            .read_message_with(|outer| {
                assert!(outer.next_field()?);
                outer.read_message_with(|inner| {
                    assert!(inner.next_field()?);
                    let payload = inner.read_bytes()?;
                    // three tags and three two-byte lengths precede the blob
                    assert_eq!(payload.as_ptr() as usize - bytes.as_ptr() as usize, 9);
                    Ok(payload.to_vec())
                })
            })
            .unwrap();
        assert_eq!(payload, blob);
        assert!(!reader.next_field().unwrap());
    }

    #[test]
    fn test_small_nested_message_overhead() {
        let blob = [7u8; 10];

        let mut writer = Writer::new();
        writer.begin_sub_message(1);
        writer.begin_sub_message(2);
        writer.write_bytes(3, &blob);
        writer.end_sub_message();
        writer.end_sub_message();
        let bytes = writer.result_buffer();

        // inner field: tag + length + blob; each wrapper adds tag + length
        assert_eq!(bytes.len(), blob.len() + 2 + 2 + 2);
        assert_eq!(bytes[..6], [0x0A, 0x0E, 0x12, 0x0C, 0x1A, 0x0A]);
    }

    #[test]
    fn test_empty_message_field() {
        let mut writer = Writer::new();
        writer.write_message_with(5, |_| {});
        assert_eq!(&writer.result_buffer()[..], &[0x2A, 0x00]);
    }

    #[test]
    fn test_result_buffer_is_flattened_once() {
        let mut writer = Writer::new();
        writer.write_message_with(1, |w| w.write_uint32(1, 1));
        let first = writer.result_buffer();
        let second = writer.result_buffer();
        assert_eq!(first, second);
        assert_eq!(first.as_ptr(), second.as_ptr());

        writer.write_bool(2, true);
        assert_eq!(&writer.result_buffer()[..], &[0x0A, 0x02, 0x08, 0x01, 0x10, 0x01]);
    }

    #[test]
    fn test_write_bytes_shared() {
        let shared = Bytes::from_static(b"abc");
        let mut writer = Writer::new();
        writer.write_message_with(1, |w| w.write_bytes_shared(2, shared.clone()));
        writer.write_uint32(3, 1);
        assert_eq!(
            &writer.result_buffer()[..],
            &[0x0A, 0x05, 0x12, 0x03, b'a', b'b', b'c', 0x18, 0x01]
        );
    }

    #[test]
    fn test_write_serialized_message() {
        let mut writer = Writer::new();
        writer.write_serialized_message(&[0x08, 0x01]);
        writer.write_uint32(2, 2);
        assert_eq!(&writer.result_buffer()[..], &[0x08, 0x01, 0x10, 0x02]);
    }

    #[test]
    fn test_len_tracks_output() {
        let mut writer = Writer::new();
        assert!(writer.is_empty());
        writer.write_string(1, "ab");
        assert_eq!(writer.len(), 4);
        writer.reset();
        assert!(writer.is_empty());
    }

    #[test]
    fn test_negative_int32_takes_ten_bytes() {
        let mut writer = Writer::new();
        writer.write_int32(1, -1);
        assert_eq!(writer.result_buffer().len(), 11);
    }

    #[test]
    fn test_packed_fixed_length_prefix() {
        let mut writer = Writer::new();
        writer.write_packed_fixed32(1, &[1, 2]);
        writer.write_packed_sfixed64(2, &[]);
        assert_eq!(
            &writer.result_buffer()[..],
            &[0x0A, 0x08, 1, 0, 0, 0, 2, 0, 0, 0]
        );
    }

    #[test]
    fn test_packed_varint_round_trip() {
        let mut writer = Writer::new();
        writer.write_packed_sint64(1, &[-1, 1, i64::MIN]);
        writer.write_packed_bool(2, &[true, false]);
        writer.write_packed_uint64_string(3, &["18446744073709551615", "1"]).unwrap();
        let bytes = writer.result_buffer();

        let mut reader = Reader::new(&bytes);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_packed_sint64().unwrap(), vec![-1, 1, i64::MIN]);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_packed_bool().unwrap(), vec![true, false]);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_packed_uint64().unwrap(), vec![u64::MAX, 1]);
    }

    #[test]
    fn test_string_writes_validate_first() {
        let mut writer = Writer::new();
        assert!(writer.write_int64_string(1, "12x").is_err());
        assert!(writer.write_uint32_string(1, "4294967296").is_err());
        assert!(writer
            .write_repeated_sint64_string(1, &["1", "oops"])
            .is_err());
        assert!(writer.write_packed_fixed64_string(1, &["-1"]).is_err());
        assert!(writer.is_empty());

        writer.write_int32_string(1, "-2").unwrap();
        writer.write_repeated_fixed64_string(2, &["5"]).unwrap();
        let bytes = writer.result_buffer();
        let mut reader = Reader::new(&bytes);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_int32().unwrap(), -2);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_fixed64().unwrap(), 5);
    }

    #[test]
    fn test_decimal_string_grammar() {
        let mut writer = Writer::new();
        assert!(writer.write_int32_string(1, "+5").is_err());
        assert!(writer.write_uint32_string(1, "+5").is_err());
        assert!(writer.write_int64_string(1, "+5").is_err());
        assert!(writer.write_uint64_string(1, "+5").is_err());
        assert!(writer.write_int32_string(1, "2147483648").is_err());
        assert!(writer.write_int32_string(1, "-2147483649").is_err());
        assert!(writer.write_uint32_string(1, "-1").is_err());
        assert!(writer.is_empty());

        writer.write_int32_string(1, "-2147483648").unwrap();
        writer.write_uint32_string(2, "4294967295").unwrap();
        let bytes = writer.result_buffer();
        let mut reader = Reader::new(&bytes);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_int32().unwrap(), i32::MIN);
        assert!(reader.next_field().unwrap());
        assert_eq!(reader.read_uint32().unwrap(), u32::MAX);
    }

    #[test]
    fn test_split_writes_match_native() {
        let mut split = Writer::new();
        split.write_split_varint64(1, Split64::from_u64(1 << 40));
        split.write_split_zigzag_varint64(2, Int64::from_i64(-3));
        split.write_split_fixed64(3, Split64::from_u64(9));
        split.write_sint_hash64(4, Hash64::from_i64(-3));

        let mut native = Writer::new();
        native.write_uint64(1, 1 << 40);
        native.write_sint64(2, -3);
        native.write_fixed64(3, 9);
        native.write_sint64(4, -3);

        assert_eq!(split.result_buffer(), native.result_buffer());
    }

    #[test]
    fn test_write_any() {
        let mut writer = Writer::new();
        writer
            .write_any(FieldType::Sint32, 1, &AnyValue::I32(-1))
            .unwrap();
        assert_eq!(
            writer.write_any(FieldType::Double, 2, &AnyValue::F32(1.0)),
            Err(Error::ValueTypeMismatch {
                field_type: FieldType::Double
            })
        );
        assert_eq!(
            writer.write_any(FieldType::Group, 2, &AnyValue::I32(0)),
            Err(Error::UnsupportedFieldType(FieldType::Group))
        );
        assert_eq!(&writer.result_buffer()[..], &[0x08, 0x01]);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        key: String,
        value: i64,
    }

    impl Message for Pair {
        fn write_to(&self, writer: &mut Writer) {
            writer.write_string(1, &self.key);
            writer.write_int64(2, self.value);
        }

        fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
            while reader.next_field()? {
                match reader.field_number() {
                    1 => self.key = reader.read_string()?,
                    2 => self.value = reader.read_int64()?,
                    _ => reader.skip_field()?,
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_repeated_messages_and_groups() {
        let pairs = vec![
            Pair {
                key: "a".to_string(),
                value: 1,
            },
            Pair {
                key: "b".to_string(),
                value: -1,
            },
        ];

        let mut writer = Writer::new();
        writer.write_repeated_message(1, &pairs);
        writer.write_repeated_group(2, &pairs);
        let bytes = writer.result_buffer();

        let mut reader = Reader::new(&bytes);
        let mut messages = Vec::new();
        let mut groups = Vec::new();
        while reader.next_field().unwrap() {
            let mut pair = Pair::default();
            match reader.field_number() {
                1 => {
                    reader.read_message(&mut pair).unwrap();
                    messages.push(pair);
                }
                2 => {
                    reader.read_group(2, &mut pair).unwrap();
                    groups.push(pair);
                }
                _ => unreachable!(),
            }
        }
        assert_eq!(messages, pairs);
        assert_eq!(groups, pairs);
    }

    #[test]
    fn test_message_trait_round_trip() {
        let pair = Pair {
            key: "key".to_string(),
            value: i64::MAX,
        };
        assert_eq!(Pair::decode(&pair.encode_to_bytes()).unwrap(), pair);
    }

    #[test]
    #[should_panic(expected = "reverse order")]
    fn test_out_of_order_bookmarks_panic() {
        let mut writer = Writer::new();
        let outer = writer.begin_delimited(1);
        let _inner = writer.begin_delimited(2);
        writer.end_delimited(outer);
    }

    #[test]
    #[should_panic(expected = "invalid field number")]
    fn test_invalid_field_number_panics() {
        let mut writer = Writer::new();
        writer.write_uint32(0, 1);
    }

    #[test]
    #[should_panic(expected = "still open")]
    fn test_result_buffer_with_open_bookmark_panics() {
        let mut writer = Writer::new();
        let _bookmark = writer.begin_delimited(1);
        writer.result_buffer();
    }
}
