//! Protobuf schema generation and wire encoding.
//!
//! Rows are encoded directly with [`CodedOutputStream`] against the schema
//! produced by [`schema_for`]: one message per table, fields numbered from 1
//! in column order.

use super::{framed_buffer, sanitize_name, RecordEncoder};
use crate::error::{ProducerError, Result};
use datagen_generator::{ColumnSet, ColumnType, GeneratedValue};
use protobuf::CodedOutputStream;

/// Message index list `[0]`: the first message in the schema.
const FIRST_MESSAGE_INDEX: u8 = 0;

/// Generate proto3 text for `columns`, with a single message named after
/// the capitalised topic.
pub fn schema_for(topic: &str, columns: &ColumnSet) -> String {
    let mut proto = String::new();

    proto.push_str("syntax = \"proto3\";\n\n");

    let needs_timestamp = columns
        .type_map()
        .iter()
        .any(|(_, t)| *t == ColumnType::TimestampMillis);
    if needs_timestamp {
        proto.push_str("import \"google/protobuf/timestamp.proto\";\n\n");
    }

    proto.push_str(&format!("message {} {{\n", message_name(topic)));
    for (index, (name, column_type)) in columns.type_map().into_iter().enumerate() {
        proto.push_str(&format!(
            "  {} {} = {};\n",
            proto_type(column_type),
            sanitize_name(name),
            index + 1
        ));
    }
    proto.push_str("}\n");

    proto
}

fn proto_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::String => "string",
        ColumnType::Long => "int64",
        ColumnType::Int => "int32",
        ColumnType::Double => "double",
        ColumnType::Float => "float",
        ColumnType::TimestampMillis => "google.protobuf.Timestamp",
    }
}

fn message_name(topic: &str) -> String {
    capitalize(&sanitize_name(topic))
}

/// Capitalize the first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Encodes rows as protobuf messages behind the registry header.
pub struct ProtobufEncoder {
    column_count: usize,
    schema_id: u32,
}

impl ProtobufEncoder {
    pub fn new(columns: &ColumnSet, schema_id: u32) -> Self {
        Self {
            column_count: columns.count(),
            schema_id,
        }
    }
}

impl RecordEncoder for ProtobufEncoder {
    fn encode(&self, row: &[GeneratedValue]) -> Result<Vec<u8>> {
        if row.len() != self.column_count {
            return Err(ProducerError::Encoding(format!(
                "row has {} values, message has {} fields",
                row.len(),
                self.column_count
            )));
        }

        let mut buffer = framed_buffer(self.schema_id, 16 * row.len());
        buffer.push(FIRST_MESSAGE_INDEX);
        {
            let mut stream = CodedOutputStream::vec(&mut buffer);
            for (index, value) in row.iter().enumerate() {
                // Field numbers start at 1
                encode_value(&mut stream, index as u32 + 1, value)?;
            }
            stream.flush()?;
        }
        Ok(buffer)
    }
}

fn encode_value(
    stream: &mut CodedOutputStream,
    field_number: u32,
    value: &GeneratedValue,
) -> Result<()> {
    match value {
        GeneratedValue::String(s) => stream.write_string(field_number, s)?,
        GeneratedValue::Long(v) => stream.write_int64(field_number, *v)?,
        GeneratedValue::Int(v) => stream.write_int32(field_number, *v)?,
        GeneratedValue::Double(v) => stream.write_double(field_number, *v)?,
        GeneratedValue::Float(v) => stream.write_float(field_number, *v)?,
        GeneratedValue::TimestampMillis(ms) => {
            // google.protobuf.Timestamp { int64 seconds = 1; int32 nanos = 2; }
            let mut timestamp_bytes = Vec::new();
            {
                let mut ts_stream = CodedOutputStream::vec(&mut timestamp_bytes);
                ts_stream.write_int64(1, ms.div_euclid(1000))?;
                ts_stream.write_int32(2, (ms.rem_euclid(1000) * 1_000_000) as i32)?;
                ts_stream.flush()?;
            }
            stream.write_bytes(field_number, &timestamp_bytes)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf::CodedInputStream;

    fn columns() -> ColumnSet {
        let mut set = ColumnSet::new();
        set.add("sym", ColumnType::String, "SYM[1-10]")
            .unwrap()
            .add("qty", ColumnType::Int, "[1-100]")
            .unwrap()
            .add("volume", ColumnType::Long, "[1-100]")
            .unwrap()
            .add("price", ColumnType::Float, "[1-100]")
            .unwrap()
            .add("ts", ColumnType::TimestampMillis, "[1-100]")
            .unwrap();
        set
    }

    #[test]
    fn test_schema_text() {
        assert_eq!(
            schema_for("stock_trans", &columns()),
            "syntax = \"proto3\";\n\n\
             import \"google/protobuf/timestamp.proto\";\n\n\
             message Stock_trans {\n\
             \x20 string sym = 1;\n\
             \x20 int32 qty = 2;\n\
             \x20 int64 volume = 3;\n\
             \x20 float price = 4;\n\
             \x20 google.protobuf.Timestamp ts = 5;\n\
             }\n"
        );
    }

    #[test]
    fn test_no_timestamp_import_without_timestamps() {
        let mut set = ColumnSet::new();
        set.add("id", ColumnType::Long, "[1-10]").unwrap();
        let proto = schema_for("ids", &set);
        assert!(!proto.contains("import"));
        assert!(proto.contains("message Ids {"));
        assert!(proto.contains("int64 id = 1;"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("users"), "Users");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("a"), "A");
    }

    #[test]
    fn test_encode_framed_message() {
        let encoder = ProtobufEncoder::new(&columns(), 258);
        let payload = encoder
            .encode(&[
                GeneratedValue::String("SYM4".to_string()),
                GeneratedValue::Int(-3),
                GeneratedValue::Long(99),
                GeneratedValue::Float(1.5),
                GeneratedValue::TimestampMillis(1_676_557_157_537),
            ])
            .unwrap();

        // Magic byte, schema id 258, message index [0]
        assert_eq!(&payload[..6], &[0, 0, 0, 1, 2, 0]);

        let mut stream = CodedInputStream::from_bytes(&payload[6..]);

        assert_eq!(stream.read_raw_varint32().unwrap() >> 3, 1);
        assert_eq!(stream.read_string().unwrap(), "SYM4");

        assert_eq!(stream.read_raw_varint32().unwrap() >> 3, 2);
        assert_eq!(stream.read_int32().unwrap(), -3);

        assert_eq!(stream.read_raw_varint32().unwrap() >> 3, 3);
        assert_eq!(stream.read_int64().unwrap(), 99);

        assert_eq!(stream.read_raw_varint32().unwrap() >> 3, 4);
        assert_eq!(stream.read_float().unwrap(), 1.5);

        assert_eq!(stream.read_raw_varint32().unwrap() >> 3, 5);
        let timestamp = stream.read_bytes().unwrap();
        let mut ts_stream = CodedInputStream::from_bytes(&timestamp);
        assert_eq!(ts_stream.read_raw_varint32().unwrap() >> 3, 1);
        assert_eq!(ts_stream.read_int64().unwrap(), 1_676_557_157);
        assert_eq!(ts_stream.read_raw_varint32().unwrap() >> 3, 2);
        assert_eq!(ts_stream.read_int32().unwrap(), 537_000_000);

        assert!(stream.eof().unwrap());
    }
}
