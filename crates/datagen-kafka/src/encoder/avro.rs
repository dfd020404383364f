//! Avro records in registry wire format.

use super::{framed_buffer, sanitize_name, RecordEncoder};
use crate::error::{ProducerError, Result};
use apache_avro::schema::RecordSchema;
use apache_avro::types::Value as AvroValue;
use apache_avro::{to_avro_datum, Schema as AvroSchema};
use datagen_generator::{ColumnSet, ColumnType, GeneratedValue};
use serde_json::{json, Value};

/// Avro record schema for `columns`, named after the topic.
///
/// `timestamp-millis` columns are nullable, as the logical type requires in
/// the registry.
pub fn schema_for(topic: &str, columns: &ColumnSet) -> String {
    let fields: Vec<Value> = columns
        .type_map()
        .into_iter()
        .map(|(name, column_type)| {
            json!({
                "name": sanitize_name(name),
                "type": avro_type(column_type),
            })
        })
        .collect();

    json!({
        "type": "record",
        "name": sanitize_name(topic),
        "fields": fields,
    })
    .to_string()
}

fn avro_type(column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::String => json!("string"),
        ColumnType::Long => json!("long"),
        ColumnType::Int => json!("int"),
        ColumnType::Double => json!("double"),
        ColumnType::Float => json!("float"),
        ColumnType::TimestampMillis => {
            json!(["null", {"type": "long", "logicalType": "timestamp-millis"}])
        }
    }
}

/// Encodes rows as Avro binary datums behind the registry header.
pub struct AvroEncoder {
    schema: AvroSchema,
    field_names: Vec<String>,
    schema_id: u32,
}

impl AvroEncoder {
    pub fn new(schema_text: &str, schema_id: u32) -> Result<Self> {
        let schema = AvroSchema::parse_str(schema_text)?;
        let field_names = match &schema {
            AvroSchema::Record(RecordSchema { fields, .. }) => {
                fields.iter().map(|f| f.name.clone()).collect()
            }
            other => {
                return Err(ProducerError::Encoding(format!(
                    "expected an Avro record schema, got {other:?}"
                )))
            }
        };

        Ok(Self {
            schema,
            field_names,
            schema_id,
        })
    }

    pub fn with_schema_id(mut self, schema_id: u32) -> Self {
        self.schema_id = schema_id;
        self
    }

    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }

    fn to_record(&self, row: &[GeneratedValue]) -> Result<AvroValue> {
        if row.len() != self.field_names.len() {
            return Err(ProducerError::Encoding(format!(
                "row has {} values, schema has {} fields",
                row.len(),
                self.field_names.len()
            )));
        }

        let fields = self
            .field_names
            .iter()
            .zip(row)
            .map(|(name, value)| (name.clone(), to_avro_value(value)))
            .collect();
        Ok(AvroValue::Record(fields))
    }
}

fn to_avro_value(value: &GeneratedValue) -> AvroValue {
    match value {
        GeneratedValue::String(s) => AvroValue::String(s.clone()),
        GeneratedValue::Long(v) => AvroValue::Long(*v),
        GeneratedValue::Int(v) => AvroValue::Int(*v),
        GeneratedValue::Double(v) => AvroValue::Double(*v),
        GeneratedValue::Float(v) => AvroValue::Float(*v),
        // Branch 1 of ["null", timestamp-millis]
        GeneratedValue::TimestampMillis(ms) => {
            AvroValue::Union(1, Box::new(AvroValue::TimestampMillis(*ms)))
        }
    }
}

impl RecordEncoder for AvroEncoder {
    fn encode(&self, row: &[GeneratedValue]) -> Result<Vec<u8>> {
        let datum = to_avro_datum(&self.schema, self.to_record(row)?)?;
        let mut buffer = framed_buffer(self.schema_id, datum.len());
        buffer.extend_from_slice(&datum);
        Ok(buffer)
    }
}
