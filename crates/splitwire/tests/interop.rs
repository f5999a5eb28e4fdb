//! Wire compatibility with prost-generated code.

use pretty_assertions::assert_eq;
use prost::Message as _;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use splitwire::{Message, Reader, Result, Writer};

#[derive(Clone, PartialEq, ::prost::Message)]
struct Sample {
    #[prost(int32, tag = "1")]
    int32: i32,
    #[prost(int64, tag = "2")]
    int64: i64,
    #[prost(uint64, tag = "3")]
    uint64: u64,
    #[prost(sint32, tag = "4")]
    sint32: i32,
    #[prost(sint64, tag = "5")]
    sint64: i64,
    #[prost(fixed32, tag = "6")]
    fixed32: u32,
    #[prost(sfixed64, tag = "7")]
    sfixed64: i64,
    #[prost(float, tag = "8")]
    float: f32,
    #[prost(double, tag = "9")]
    double: f64,
    #[prost(bool, tag = "10")]
    flag: bool,
    #[prost(string, tag = "11")]
    text: String,
    #[prost(bytes = "vec", tag = "12")]
    data: Vec<u8>,
    #[prost(int32, repeated, tag = "13")]
    packed: Vec<i32>,
    #[prost(uint32, repeated, packed = "false", tag = "14")]
    unpacked: Vec<u32>,
    #[prost(message, optional, tag = "15")]
    child: Option<Child>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
struct Child {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(sint64, repeated, tag = "2")]
    values: Vec<i64>,
}

impl Message for Child {
    fn write_to(&self, writer: &mut Writer) {
        if !self.name.is_empty() {
            writer.write_string(1, &self.name);
        }
        writer.write_packed_sint64(2, &self.values);
    }

    fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        while reader.next_field()? {
            match reader.field_number() {
                1 => self.name = reader.read_string()?,
                2 if reader.is_delimited() => self.values.extend(reader.read_packed_sint64()?),
                2 => self.values.push(reader.read_sint64()?),
                _ => reader.skip_field()?,
            }
        }
        Ok(())
    }
}

impl Message for Sample {
    fn write_to(&self, writer: &mut Writer) {
        if self.int32 != 0 {
            writer.write_int32(1, self.int32);
        }
        if self.int64 != 0 {
            writer.write_int64(2, self.int64);
        }
        if self.uint64 != 0 {
            writer.write_uint64(3, self.uint64);
        }
        if self.sint32 != 0 {
            writer.write_sint32(4, self.sint32);
        }
        if self.sint64 != 0 {
            writer.write_sint64(5, self.sint64);
        }
        if self.fixed32 != 0 {
            writer.write_fixed32(6, self.fixed32);
        }
        if self.sfixed64 != 0 {
            writer.write_sfixed64(7, self.sfixed64);
        }
        if self.float != 0.0 {
            writer.write_float(8, self.float);
        }
        if self.double != 0.0 {
            writer.write_double(9, self.double);
        }
        if self.flag {
            writer.write_bool(10, self.flag);
        }
        if !self.text.is_empty() {
            writer.write_string(11, &self.text);
        }
        if !self.data.is_empty() {
            writer.write_bytes(12, &self.data);
        }
        writer.write_packed_int32(13, &self.packed);
        writer.write_repeated_uint32(14, &self.unpacked);
        if let Some(child) = &self.child {
            writer.write_message(15, child);
        }
    }

    fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        while reader.next_field()? {
            match reader.field_number() {
                1 => self.int32 = reader.read_int32()?,
                2 => self.int64 = reader.read_int64()?,
                3 => self.uint64 = reader.read_uint64()?,
                4 => self.sint32 = reader.read_sint32()?,
                5 => self.sint64 = reader.read_sint64()?,
                6 => self.fixed32 = reader.read_fixed32()?,
                7 => self.sfixed64 = reader.read_sfixed64()?,
                8 => self.float = reader.read_float()?,
                9 => self.double = reader.read_double()?,
                10 => self.flag = reader.read_bool()?,
                11 => self.text = reader.read_string()?,
                12 => self.data = reader.read_bytes()?.to_vec(),
                13 if reader.is_delimited() => self.packed.extend(reader.read_packed_int32()?),
                13 => self.packed.push(reader.read_int32()?),
                14 if reader.is_delimited() => self.unpacked.extend(reader.read_packed_uint32()?),
                14 => self.unpacked.push(reader.read_uint32()?),
                15 => {
                    let child = self.child.get_or_insert_with(Child::default);
                    reader.read_message(child)?;
                }
                _ => reader.skip_field()?,
            }
        }
        Ok(())
    }
}

fn sample() -> Sample {
    Sample {
        int32: -42,
        int64: i64::MIN,
        uint64: u64::MAX,
        sint32: -1,
        sint64: 1 << 40,
        fixed32: 0xDEAD_BEEF,
        sfixed64: -7,
        float: 1.5,
        double: -2.25e300,
        flag: true,
        text: "héllo wörld".to_string(),
        data: vec![0, 1, 2, 254, 255],
        packed: vec![1, -1, 300, i32::MAX],
        unpacked: vec![0, 128, u32::MAX],
        child: Some(Child {
            name: "child".to_string(),
            values: vec![-3, 0, i64::MAX],
        }),
    }
}

#[test]
fn test_writer_matches_prost_encoding() {
    let value = sample();
    let ours = value.encode_to_bytes();
    assert_eq!(ours.to_vec(), value.encode_to_vec());
}

#[test]
fn test_reader_decodes_prost_output() {
    let value = sample();
    let bytes = value.encode_to_vec();
    let decoded = <Sample as Message>::decode(&bytes).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_prost_decodes_writer_output() {
    let value = sample();
    let bytes = <Sample as Message>::encode_to_bytes(&value);
    let decoded = <Sample as prost::Message>::decode(bytes).unwrap();
    assert_eq!(decoded, value);
}

#[derive(Debug, Default, PartialEq)]
struct TextOnly {
    text: String,
}

impl Message for TextOnly {
    fn write_to(&self, writer: &mut Writer) {
        writer.write_string(11, &self.text);
    }

    fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        while reader.next_field()? {
            match reader.field_number() {
                11 => self.text = reader.read_string()?,
                _ => reader.skip_field()?,
            }
        }
        Ok(())
    }
}

#[test]
fn test_unknown_fields_are_skipped() {
    let bytes = sample().encode_to_vec();
    let decoded = TextOnly::decode(&bytes).unwrap();
    assert_eq!(decoded.text, "héllo wörld");
}

fn descriptor() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("demo/thing.proto".to_string()),
        package: Some("demo".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Thing".to_string()),
            field: vec![
                FieldDescriptorProto {
                    name: Some("id".to_string()),
                    number: Some(1),
                    label: Some(Label::Optional as i32),
                    r#type: Some(Type::Int64 as i32),
                    ..Default::default()
                },
                FieldDescriptorProto {
                    name: Some("tags".to_string()),
                    number: Some(2),
                    label: Some(Label::Repeated as i32),
                    r#type: Some(Type::String as i32),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// The subset of a file descriptor this test cares about
#[derive(Debug, Default, PartialEq)]
struct FileSummary {
    name: String,
    package: String,
    syntax: String,
    messages: Vec<MessageSummary>,
}

#[derive(Debug, Default, PartialEq)]
struct MessageSummary {
    name: String,
    fields: Vec<(String, i32, i32, i32)>,
}

impl Message for FileSummary {
    fn write_to(&self, writer: &mut Writer) {
        writer.write_string(1, &self.name);
        writer.write_string(2, &self.package);
        writer.write_repeated_message(4, &self.messages);
        writer.write_string(12, &self.syntax);
    }

    fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        while reader.next_field()? {
            match reader.field_number() {
                1 => self.name = reader.read_string()?,
                2 => self.package = reader.read_string()?,
                4 => {
                    let mut message = MessageSummary::default();
                    reader.read_message(&mut message)?;
                    self.messages.push(message);
                }
                12 => self.syntax = reader.read_string()?,
                _ => reader.skip_field()?,
            }
        }
        Ok(())
    }
}

impl Message for MessageSummary {
    fn write_to(&self, writer: &mut Writer) {
        writer.write_string(1, &self.name);
        for (name, number, label, field_type) in &self.fields {
            writer.write_message_with(2, |field| {
                field.write_string(1, name);
                field.write_int32(3, *number);
                field.write_enum(4, *label);
                field.write_enum(5, *field_type);
            });
        }
    }

    fn merge_from(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        while reader.next_field()? {
            match reader.field_number() {
                1 => self.name = reader.read_string()?,
                2 => {
                    let field = reader.read_message_with(|field| {
                        let mut entry = (String::new(), 0, 0, 0);
                        while field.next_field()? {
                            match field.field_number() {
                                1 => entry.0 = field.read_string()?,
                                3 => entry.1 = field.read_int32()?,
                                4 => entry.2 = field.read_enum()?,
                                5 => entry.3 = field.read_enum()?,
                                _ => field.skip_field()?,
                            }
                        }
                        Ok(entry)
                    })?;
                    self.fields.push(field);
                }
                _ => reader.skip_field()?,
            }
        }
        Ok(())
    }
}

fn summary() -> FileSummary {
    FileSummary {
        name: "demo/thing.proto".to_string(),
        package: "demo".to_string(),
        syntax: "proto3".to_string(),
        messages: vec![MessageSummary {
            name: "Thing".to_string(),
            fields: vec![
                (
                    "id".to_string(),
                    1,
                    Label::Optional as i32,
                    Type::Int64 as i32,
                ),
                (
                    "tags".to_string(),
                    2,
                    Label::Repeated as i32,
                    Type::String as i32,
                ),
            ],
        }],
    }
}

#[test]
fn test_read_file_descriptor() {
    let bytes = descriptor().encode_to_vec();
    assert_eq!(FileSummary::decode(&bytes).unwrap(), summary());
}

#[test]
fn test_write_file_descriptor() {
    let bytes = summary().encode_to_bytes();
    let decoded = FileDescriptorProto::decode(bytes).unwrap();
    assert_eq!(decoded, descriptor());
}

#[test]
fn test_truncated_descriptor_is_rejected() {
    let bytes = descriptor().encode_to_vec();
    for cut in [1, bytes.len() / 2, bytes.len() - 1] {
        let result = FileSummary::decode(&bytes[..cut]);
        assert!(result.is_err(), "cut at {cut} should fail");
    }
}
