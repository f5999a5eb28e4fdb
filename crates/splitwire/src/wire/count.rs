//! Scanning helpers that count values in raw wire data without decoding it.
//!
//! The field counters look at a run of consecutive fields and stop at the
//! first tag that does not match, so they size a repeated field that was
//! written unpacked. A truncated trailing field is not counted.

use super::{make_tag, WireType};
use std::fmt::Write;

/// Counts the varints in a buffer of back-to-back varints (packed field
/// payload). A trailing varint without a terminator byte is not counted.
pub fn count_varints(buffer: &[u8]) -> usize {
    buffer.iter().filter(|&&b| b & 0x80 == 0).count()
}

/// Encodes `tag` as a varint into `out`, returning the used prefix
fn tag_bytes(tag: u32, out: &mut [u8; 5]) -> &[u8] {
    let mut value = tag;
    let mut len = 0;
    while value >= 0x80 {
        out[len] = (value as u8 & 0x7F) | 0x80;
        value >>= 7;
        len += 1;
    }
    out[len] = value as u8;
    &out[..=len]
}

/// Returns the index just past the varint starting at `cursor`
fn skip_varint(buffer: &[u8], cursor: usize) -> Option<usize> {
    buffer[cursor..]
        .iter()
        .position(|&b| b & 0x80 == 0)
        .map(|i| cursor + i + 1)
}

/// Reads the varint starting at `cursor` as a length
fn read_length(buffer: &[u8], cursor: usize) -> Option<(usize, usize)> {
    let mut length = 0u64;
    for (i, &b) in buffer[cursor..].iter().take(10).enumerate() {
        length |= u64::from(b & 0x7F) << (7 * i);
        if b & 0x80 == 0 {
            return Some((usize::try_from(length).ok()?, cursor + i + 1));
        }
    }
    None
}

/// Shared driver: repeatedly match `tag`, then let `skip` step over the value
fn count_fields<F>(buffer: &[u8], field: u32, wire_type: WireType, mut skip: F) -> usize
where
    F: FnMut(&[u8], usize) -> Option<usize>,
{
    let mut scratch = [0u8; 5];
    let tag = tag_bytes(make_tag(field, wire_type), &mut scratch);

    let mut count = 0;
    let mut cursor = 0;
    while cursor < buffer.len() {
        if !buffer[cursor..].starts_with(tag) {
            break;
        }
        cursor += tag.len();
        match skip(buffer, cursor) {
            Some(next) if next <= buffer.len() => {
                count += 1;
                cursor = next;
            }
            _ => break,
        }
    }
    count
}

/// Counts consecutive varint fields with the given field number
pub fn count_varint_fields(buffer: &[u8], field: u32) -> usize {
    count_fields(buffer, field, WireType::Varint, skip_varint)
}

/// Counts consecutive fixed32 fields with the given field number
pub fn count_fixed32_fields(buffer: &[u8], field: u32) -> usize {
    count_fields(buffer, field, WireType::Fixed32, |_, cursor| Some(cursor + 4))
}

/// Counts consecutive fixed64 fields with the given field number
pub fn count_fixed64_fields(buffer: &[u8], field: u32) -> usize {
    count_fields(buffer, field, WireType::Fixed64, |_, cursor| Some(cursor + 8))
}

/// Counts consecutive length-delimited fields with the given field number
pub fn count_delimited_fields(buffer: &[u8], field: u32) -> usize {
    count_fields(buffer, field, WireType::Delimited, |buf, cursor| {
        let (length, body) = read_length(buf, cursor)?;
        body.checked_add(length)
    })
}

/// Renders bytes as a quoted text-format string using `\xNN` escapes for
/// every byte, e.g. `[1, 31]` becomes `"\x01\x1f"`
pub fn debug_bytes_to_text_format(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('"');
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "\\x{b:02x}");
    }
    out.push('"');
    out
}
