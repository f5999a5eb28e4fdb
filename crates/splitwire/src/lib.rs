//! # splitwire
//!
//! A codec for the Protocol Buffer binary wire format.
//!
//! This crate provides:
//! - Varint, zigzag and fixed-width encoding and decoding
//! - 64-bit values carried as two 32-bit halves, with the arithmetic and
//!   decimal/hex conversions needed to print and parse them
//! - IEEE-754 bit assembly and disassembly for `float` and `double`
//! - A field-level [`Reader`] and [`Writer`] that handle tags, packed
//!   repeated fields, submessages and groups
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: Wire types, field types, tags and bit-level helpers
//! - [`arith`]: Split 64-bit integer arithmetic
//! - [`hash64`]: Eight-byte opaque 64-bit values
//! - [`codec`]: Primitive [`Decoder`] and [`Encoder`]
//! - [`field`]: Field-tag [`Reader`] and [`Writer`]
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use splitwire::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.write_uint32(1, 150);
//! writer.write_message_with(2, |inner| inner.write_string(1, "hi"));
//! let bytes = writer.result_buffer();
//! assert_eq!(&bytes[..], &[0x08, 0x96, 0x01, 0x12, 0x04, 0x0a, 0x02, b'h', b'i']);
//!
//! let mut reader = Reader::new(&bytes);
//! while reader.next_field()? {
//!     match reader.field_number() {
//!         1 => assert_eq!(reader.read_uint32()?, 150),
//!         2 => {
//!             let text = reader.read_message_with(|inner| {
//!                 inner.next_field()?;
//!                 inner.read_string()
//!             })?;
//!             assert_eq!(text, "hi");
//!         }
//!         _ => reader.skip_field()?,
//!     }
//! }
//! # Ok::<(), splitwire::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! Message types plug into the reader and writer through the [`Message`]
//! trait.
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod arith;
pub mod codec;
pub mod error;
pub mod field;
pub mod hash64;
pub mod wire;

// Re-export primary types for convenience
pub use arith::{Int64, Split64};
pub use codec::{Decoder, Encoder};
pub use error::{Error, Result};
pub use field::{AnyValue, Bookmark, Message, Reader, ReaderConfig, Writer};
pub use hash64::Hash64;
pub use wire::{FieldType, WireType, MAX_FIELD_NUMBER};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
