//! Byte-level codec.
//!
//! [`Decoder`] and [`Encoder`] read and write single primitive values
//! (varints, zigzag varints, fixed-width integers, floats, raw bytes and
//! strings) with no knowledge of field tags. The field layer in
//! [`crate::field`] builds on them.

mod decoder;
mod encoder;

pub use decoder::Decoder;
pub use encoder::Encoder;
