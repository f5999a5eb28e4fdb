//! Field-level reading and writing.
//!
//! [`Reader`] walks a buffer field by field: [`Reader::next_field`] parses a
//! tag, the caller dispatches on [`Reader::field_number`] and calls the typed
//! read for that field (or [`Reader::skip_field`] for unknown ones).
//! Submessages and groups recurse through closures or the [`Message`] trait.
//!
//! [`Writer`] emits tagged fields and frames submessages with a deferred
//! length prefix, so nested messages are written in a single pass.
//!
//! ## Example
//!
//! ```
//! use splitwire::{Message, Reader, Result, Writer};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Message for Point {
//!     fn write_to(&self, writer: &mut Writer) {
//!         writer.write_sint32(1, self.x);
//!         writer.write_sint32(2, self.y);
//!     }
//!
//!     fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
//!         while reader.next_field()? {
//!             match reader.field_number() {
//!                 1 => self.x = reader.read_sint32()?,
//!                 2 => self.y = reader.read_sint32()?,
//!                 _ => reader.skip_field()?,
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let point = Point { x: -3, y: 7 };
//! let bytes = point.encode_to_bytes();
//! assert_eq!(&bytes[..], &[0x08, 0x05, 0x10, 0x0e]);
//! assert_eq!(Point::decode(&bytes)?, point);
//! # Ok::<(), splitwire::Error>(())
//! ```

mod reader;
mod writer;

use crate::error::Result;
use crate::hash64::Hash64;
use bytes::Bytes;

pub use reader::Reader;
pub use writer::{Bookmark, Writer};

/// Default maximum nesting depth of submessages and groups
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Configuration for a [`Reader`]
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Maximum depth of nested submessages and groups. Reading deeper
    /// fails with [`Error::RecursionLimitExceeded`](crate::Error::RecursionLimitExceeded).
    pub recursion_limit: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl ReaderConfig {
    /// Creates a new reader config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// A message that can serialize itself to a [`Writer`] and parse itself
/// from a [`Reader`].
///
/// This is the only interface the codec needs from message types; field
/// names, defaults and presence are the implementor's business.
pub trait Message {
    /// Writes every present field
    fn write_to(&self, writer: &mut Writer);

    /// Reads fields until the reader reports no more, merging them into
    /// `self`
    fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()>;

    /// Serializes the message into a fresh buffer
    fn encode_to_bytes(&self) -> Bytes {
        let mut writer = Writer::new();
        self.write_to(&mut writer);
        writer.result_buffer()
    }

    /// Parses a message from a complete buffer
    fn decode(bytes: &[u8]) -> Result<Self>
    where
        Self: Default + Sized,
    {
        let mut message = Self::default();
        let mut reader = Reader::new(bytes);
        message.merge_from(&mut reader)?;
        match reader.error() {
            Some(err) => Err(err.clone()),
            None => Ok(message),
        }
    }
}

/// A single non-message field value, as produced by
/// [`Reader::read_any`] and consumed by [`Writer::write_any`]
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    /// `bool`
    Bool(bool),
    /// `int32`, `sint32`, `sfixed32` and enums
    I32(i32),
    /// `int64`, `sint64` and `sfixed64`
    I64(i64),
    /// `uint32` and `fixed32`
    U32(u32),
    /// `uint64` and `fixed64`
    U64(u64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(Vec<u8>),
    /// 64-bit hash pseudo-types
    Hash64(Hash64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_config_builder() {
        let config = ReaderConfig::new().recursion_limit(8);
        assert_eq!(config.recursion_limit, 8);
        assert_eq!(ReaderConfig::default().recursion_limit, DEFAULT_RECURSION_LIMIT);
    }
}
