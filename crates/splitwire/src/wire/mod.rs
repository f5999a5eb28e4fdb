//! Wire format vocabulary: wire types, field types and field tags.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing `field_number * 8 + wire_type`
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: FIXED64 (fixed64, sfixed64, double)
//! - 2: DELIMITED (string, bytes, embedded messages, packed repeated fields)
//! - 3/4: START_GROUP / END_GROUP (groups)
//! - 5: FIXED32 (fixed32, sfixed32, float)

pub mod bits;
pub mod count;

use crate::error::{Error, Result};

pub use count::{
    count_delimited_fields, count_fixed32_fields, count_fixed64_fields, count_varint_fields,
    count_varints, debug_bytes_to_text_format,
};

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Field number reported by a reader that is not positioned on a field
pub const INVALID_FIELD_NUMBER: u32 = 0;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width, little-endian
    Fixed64 = 1,
    /// Length-delimited (strings, bytes, embedded messages, packed fields)
    Delimited = 2,
    /// Start group
    StartGroup = 3,
    /// End group
    EndGroup = 4,
    /// 32-bit fixed-width, little-endian
    Fixed32 = 5,
}

impl WireType {
    /// Returns the numeric value used in field tags
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Returns true for the wire types a packed repeated field may contain
    pub const fn is_packable(self) -> bool {
        matches!(self, WireType::Varint | WireType::Fixed64 | WireType::Fixed32)
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::Delimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            _ => Err(Error::invalid_wire_type(u32::from(value), 0)),
        }
    }
}

/// Descriptor field types, numbered as in `descriptor.proto`.
///
/// `Fhash64` and `Vhash64` are pseudo-types for 64-bit values carried as an
/// opaque [`Hash64`](crate::Hash64) in fixed64 or varint encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    /// `double`
    Double = 1,
    /// `float`
    Float = 2,
    /// `int64`
    Int64 = 3,
    /// `uint64`
    Uint64 = 4,
    /// `int32`
    Int32 = 5,
    /// `fixed64`
    Fixed64 = 6,
    /// `fixed32`
    Fixed32 = 7,
    /// `bool`
    Bool = 8,
    /// `string`
    String = 9,
    /// `group`
    Group = 10,
    /// Embedded message
    Message = 11,
    /// `bytes`
    Bytes = 12,
    /// `uint32`
    Uint32 = 13,
    /// Enum value
    Enum = 14,
    /// `sfixed32`
    Sfixed32 = 15,
    /// `sfixed64`
    Sfixed64 = 16,
    /// `sint32`
    Sint32 = 17,
    /// `sint64`
    Sint64 = 18,
    /// 64-bit hash carried as fixed64
    Fhash64 = 30,
    /// 64-bit hash carried as varint
    Vhash64 = 31,
}

impl FieldType {
    /// Returns the wire type used to encode a single value of this type.
    ///
    /// Groups report [`WireType::StartGroup`]; their terminator is implied.
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool
            | FieldType::Enum
            | FieldType::Vhash64 => WireType::Varint,
            FieldType::Double | FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Fhash64 => {
                WireType::Fixed64
            }
            FieldType::String | FieldType::Message | FieldType::Bytes => WireType::Delimited,
            FieldType::Float | FieldType::Fixed32 | FieldType::Sfixed32 => WireType::Fixed32,
            FieldType::Group => WireType::StartGroup,
        }
    }
}

/// Builds a field tag from a field number and wire type
pub const fn make_tag(field_number: u32, wire_type: WireType) -> u32 {
    (field_number << 3) | wire_type.as_u32()
}

/// Splits a field tag into its field number and raw wire type bits
pub const fn split_tag(tag: u32) -> (u32, u32) {
    (tag >> 3, tag & 0x07)
}

/// Returns true if `field_number` may appear in a field tag
pub const fn is_valid_field_number(field_number: u32) -> bool {
    field_number >= 1 && field_number <= MAX_FIELD_NUMBER
}

/// Number of bytes needed to encode `value` as an unsigned varint
pub const fn varint_size(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_conversion() {
        assert_eq!(WireType::try_from(0).unwrap(), WireType::Varint);
        assert_eq!(WireType::try_from(1).unwrap(), WireType::Fixed64);
        assert_eq!(WireType::try_from(2).unwrap(), WireType::Delimited);
        assert_eq!(WireType::try_from(3).unwrap(), WireType::StartGroup);
        assert_eq!(WireType::try_from(4).unwrap(), WireType::EndGroup);
        assert_eq!(WireType::try_from(5).unwrap(), WireType::Fixed32);
        assert!(WireType::try_from(6).is_err());
        assert!(WireType::try_from(7).is_err());
    }

    #[test]
    fn test_field_type_wire_types() {
        assert_eq!(FieldType::Sint64.wire_type(), WireType::Varint);
        assert_eq!(FieldType::Bool.wire_type(), WireType::Varint);
        assert_eq!(FieldType::Double.wire_type(), WireType::Fixed64);
        assert_eq!(FieldType::Sfixed64.wire_type(), WireType::Fixed64);
        assert_eq!(FieldType::Bytes.wire_type(), WireType::Delimited);
        assert_eq!(FieldType::Message.wire_type(), WireType::Delimited);
        assert_eq!(FieldType::Float.wire_type(), WireType::Fixed32);
        assert_eq!(FieldType::Group.wire_type(), WireType::StartGroup);
    }

    #[test]
    fn test_packable_wire_types() {
        assert!(WireType::Varint.is_packable());
        assert!(WireType::Fixed32.is_packable());
        assert!(WireType::Fixed64.is_packable());
        assert!(!WireType::Delimited.is_packable());
        assert!(!WireType::StartGroup.is_packable());
        assert!(!FieldType::Message.wire_type().is_packable());
    }

    #[test]
    fn test_tags() {
        assert_eq!(make_tag(1, WireType::Varint), 0x08);
        assert_eq!(make_tag(2, WireType::Delimited), 0x12);
        assert_eq!(split_tag(0x1a), (3, 2));
        assert!(!is_valid_field_number(0));
        assert!(is_valid_field_number(MAX_FIELD_NUMBER));
        assert!(!is_valid_field_number(MAX_FIELD_NUMBER + 1));
    }

    #[test]
    fn test_varint_size() {
        assert_eq!(varint_size(0), 1);
        assert_eq!(varint_size(127), 1);
        assert_eq!(varint_size(128), 2);
        assert_eq!(varint_size(16_383), 2);
        assert_eq!(varint_size(16_384), 3);
        assert_eq!(varint_size(u64::from(u32::MAX)), 5);
        assert_eq!(varint_size(u64::MAX), 10);
    }
}
