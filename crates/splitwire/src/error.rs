//! Error types for the splitwire codec.
//!
//! Decoding failures caused by malformed or truncated wire data are reported
//! through [`Error`] values (and also latch the error flag on the
//! [`Decoder`](crate::codec::Decoder) / [`Reader`](crate::field::Reader) that
//! observed them). Contract violations by the calling code, such as writing a
//! field number outside `1..=2^29-1`, are programmer errors and panic instead.

use crate::wire::{FieldType, WireType};
use thiserror::Error;

/// Result type alias for splitwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all splitwire operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A varint did not terminate within its byte budget, or carried bits
    /// that are invalid for the requested width
    #[error("failed to decode varint at offset {offset}: encoding is invalid")]
    MalformedVarint {
        /// Byte offset of the first byte of the varint
        offset: usize,
    },

    /// A read would move the cursor past the logical end of the block
    #[error("read of {requested} bytes at offset {offset} runs past end of block at {end}")]
    ReadPastEnd {
        /// Cursor position when the read was attempted
        offset: usize,
        /// Number of bytes the read needed
        requested: usize,
        /// Logical end bound of the decoder
        end: usize,
    },

    /// A length prefix references bytes beyond the end of the whole buffer
    #[error("length {length} at offset {offset} exceeds buffer of {buffer_len} bytes")]
    LengthOutOfBounds {
        /// Cursor position of the length-delimited payload
        offset: usize,
        /// Declared payload length
        length: usize,
        /// Total length of the underlying buffer
        buffer_len: usize,
    },

    /// A field tag carried a wire type outside the six valid values
    #[error("invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType {
        /// The raw wire type bits
        wire_type: u32,
        /// Byte offset of the field tag
        offset: usize,
    },

    /// A field tag carried field number zero or one above the maximum
    #[error("invalid field number {number}: must be between 1 and {max}")]
    InvalidFieldNumber {
        /// The invalid field number
        number: u32,
        /// Maximum valid field number
        max: u32,
    },

    /// A typed read was requested for a field with a different wire type
    #[error("field {field} has wire type {actual:?}, expected {expected:?}")]
    WireTypeMismatch {
        /// Field number of the current field
        field: u32,
        /// Wire type the read requires
        expected: WireType,
        /// Wire type of the current field, if any
        actual: Option<WireType>,
    },

    /// The reader is not positioned on a field
    #[error("reader is not positioned on a field")]
    NoField,

    /// The stream ended inside a group
    #[error("unmatched start-group tag for field {field}: stream ended")]
    UnmatchedStartGroup {
        /// Field number of the open group
        field: u32,
    },

    /// An end-group tag did not match the innermost open group
    #[error("unmatched end-group tag for field {found} (open group: {expected:?})")]
    UnmatchedEndGroup {
        /// Field number of the innermost open group, if any
        expected: Option<u32>,
        /// Field number carried by the end-group tag
        found: u32,
    },

    /// A group callback returned before consuming the group's end tag
    #[error("group for field {field} did not end with an end-group tag")]
    UnterminatedGroup {
        /// Field number of the group
        field: u32,
    },

    /// Message or group nesting exceeded the configured depth
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimitExceeded {
        /// The configured limit
        limit: u32,
    },

    /// The decoder already failed; no further fields can be read
    #[error("decoder is in an error state")]
    DecoderFailed,

    /// A string was not a valid 64-bit decimal number
    #[error("invalid decimal string '{0}'")]
    InvalidDecimal(String),

    /// A string was not a valid `0x`-prefixed 16-digit hex number
    #[error("invalid hex string '{0}'")]
    InvalidHex(String),

    /// `read_any`/`write_any` was asked for a message or group type
    #[error("field type {0:?} is not supported here")]
    UnsupportedFieldType(FieldType),

    /// `write_any` was given a value that does not match the field type
    #[error("value does not match field type {field_type:?}")]
    ValueTypeMismatch {
        /// The requested field type
        field_type: FieldType,
    },
}

impl Error {
    /// Creates a new malformed varint error
    pub fn malformed_varint(offset: usize) -> Self {
        Self::MalformedVarint { offset }
    }

    /// Creates a new read-past-end error
    pub fn read_past_end(offset: usize, requested: usize, end: usize) -> Self {
        Self::ReadPastEnd {
            offset,
            requested,
            end,
        }
    }

    /// Creates a new length-out-of-bounds error
    pub fn length_out_of_bounds(offset: usize, length: usize, buffer_len: usize) -> Self {
        Self::LengthOutOfBounds {
            offset,
            length,
            buffer_len,
        }
    }

    /// Creates a new invalid wire type error
    pub fn invalid_wire_type(wire_type: u32, offset: usize) -> Self {
        Self::InvalidWireType { wire_type, offset }
    }

    /// Creates a new invalid decimal error
    pub fn invalid_decimal(value: impl Into<String>) -> Self {
        Self::InvalidDecimal(value.into())
    }

    /// Creates a new invalid hex error
    pub fn invalid_hex(value: impl Into<String>) -> Self {
        Self::InvalidHex(value.into())
    }

    /// Returns true if the error was caused by malformed or truncated wire
    /// data, as opposed to a schema mismatch or bad caller input
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedVarint { .. }
                | Self::ReadPastEnd { .. }
                | Self::LengthOutOfBounds { .. }
                | Self::InvalidWireType { .. }
                | Self::InvalidFieldNumber { .. }
                | Self::UnmatchedStartGroup { .. }
                | Self::UnmatchedEndGroup { .. }
                | Self::RecursionLimitExceeded { .. }
                | Self::DecoderFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed_varint(17);
        assert!(err.to_string().contains("varint"));
        assert!(err.to_string().contains("17"));

        let err = Error::read_past_end(4, 8, 6);
        assert_eq!(
            err.to_string(),
            "read of 8 bytes at offset 4 runs past end of block at 6"
        );
    }

    #[test]
    fn test_is_corrupt_input() {
        assert!(Error::malformed_varint(0).is_corrupt_input());
        assert!(Error::UnmatchedStartGroup { field: 3 }.is_corrupt_input());
        assert!(!Error::invalid_decimal("12a").is_corrupt_input());
        assert!(!Error::WireTypeMismatch {
            field: 1,
            expected: WireType::Varint,
            actual: Some(WireType::Fixed64),
        }
        .is_corrupt_input());
    }
}
