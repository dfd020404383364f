//! Record encodings and their schemas.
//!
//! Each format turns a row of [`GeneratedValue`]s, in column order, into a
//! message payload. Registry-backed formats prefix the payload with the
//! registry wire header (magic byte `0` and the big-endian schema id).

pub mod avro;
pub mod json;
pub mod proto;

use crate::error::Result;
use clap::ValueEnum;
use datagen_generator::GeneratedValue;
use std::fmt;

pub use self::avro::AvroEncoder;
pub use self::json::JsonEncoder;
pub use self::proto::ProtobufEncoder;

/// Serialization format of produced records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordFormat {
    Avro,
    Json,
    Protobuf,
}

impl RecordFormat {
    /// Whether records need a schema published to the registry.
    pub fn registry_backed(&self) -> bool {
        !matches!(self, RecordFormat::Json)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFormat::Avro => "avro",
            RecordFormat::Json => "json",
            RecordFormat::Protobuf => "protobuf",
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes one row into a message payload.
pub trait RecordEncoder: Send + Sync {
    fn encode(&self, row: &[GeneratedValue]) -> Result<Vec<u8>>;
}

const MAGIC_BYTE: u8 = 0;

/// Start a payload with the registry wire header.
pub(crate) fn framed_buffer(schema_id: u32, capacity: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(capacity + 5);
    buffer.push(MAGIC_BYTE);
    buffer.extend_from_slice(&schema_id.to_be_bytes());
    buffer
}

/// Replace characters not allowed in schema identifiers with `_`.
pub(crate) fn sanitize_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() || sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("stock_trans"), "stock_trans");
        assert_eq!(sanitize_name("stock-trans.v2"), "stock_trans_v2");
        assert_eq!(sanitize_name("1table"), "_1table");
        assert_eq!(sanitize_name(""), "_");
    }

    #[test]
    fn test_framed_buffer() {
        assert_eq!(framed_buffer(0x0102_0304, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_registry_backed() {
        assert!(RecordFormat::Avro.registry_backed());
        assert!(RecordFormat::Protobuf.registry_backed());
        assert!(!RecordFormat::Json.registry_backed());
    }
}
