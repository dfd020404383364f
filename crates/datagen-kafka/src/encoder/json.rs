//! Self-describing JSON records.
//!
//! JSON needs no registry; consumers declare a structurally equivalent type
//! themselves, for which [`type_spec`] lists the column types.

use super::RecordEncoder;
use crate::error::{ProducerError, Result};
use datagen_generator::{ColumnSet, GeneratedValue};
use serde_json::{Map, Value};

/// Ordered `{"column": "type"}` object describing a record.
pub fn type_spec(columns: &ColumnSet) -> String {
    let spec: Map<String, Value> = columns
        .type_map()
        .into_iter()
        .map(|(name, column_type)| (name.to_string(), Value::from(column_type.as_str())))
        .collect();
    Value::Object(spec).to_string()
}

/// Encodes rows as JSON objects keyed by column name.
pub struct JsonEncoder {
    names: Vec<String>,
}

impl JsonEncoder {
    pub fn new(columns: &ColumnSet) -> Self {
        Self {
            names: columns.names().into_iter().map(str::to_string).collect(),
        }
    }
}

fn to_json_value(value: &GeneratedValue) -> Value {
    match value {
        GeneratedValue::String(s) => Value::from(s.as_str()),
        GeneratedValue::Long(v) | GeneratedValue::TimestampMillis(v) => Value::from(*v),
        GeneratedValue::Int(v) => Value::from(*v),
        GeneratedValue::Double(v) => Value::from(*v),
        GeneratedValue::Float(v) => Value::from(*v),
    }
}

impl RecordEncoder for JsonEncoder {
    fn encode(&self, row: &[GeneratedValue]) -> Result<Vec<u8>> {
        if row.len() != self.names.len() {
            return Err(ProducerError::Encoding(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.names.len()
            )));
        }

        let record: Map<String, Value> = self
            .names
            .iter()
            .zip(row)
            .map(|(name, value)| (name.clone(), to_json_value(value)))
            .collect();
        Ok(serde_json::to_vec(&record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_generator::ColumnType;

    fn columns() -> ColumnSet {
        let mut set = ColumnSet::new();
        set.add("sym", ColumnType::String, "SYM[1-10]")
            .unwrap()
            .add("price", ColumnType::Float, "[1-10]")
            .unwrap()
            .add("ts", ColumnType::TimestampMillis, "[1-10]")
            .unwrap();
        set
    }

    #[test]
    fn test_type_spec_keeps_column_order() {
        assert_eq!(
            type_spec(&columns()),
            r#"{"sym":"string","price":"float","ts":"timestamp-millis"}"#
        );
    }

    #[test]
    fn test_encode_object() {
        let encoder = JsonEncoder::new(&columns());
        let payload = encoder
            .encode(&[
                GeneratedValue::String("SYM2".to_string()),
                GeneratedValue::Float(-4.5),
                GeneratedValue::TimestampMillis(1676557157537),
            ])
            .unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"{"sym":"SYM2","price":-4.5,"ts":1676557157537}"#
        );
    }
}
