//! Producer compression codecs.

use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Compression applied by the broker client to record batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionCodec {
    None,
    Gzip,
    #[default]
    Snappy,
    Lz4,
    Zstd,
}

impl CompressionCodec {
    /// Value for the client's `compression.type` setting.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionCodec::None => "none",
            CompressionCodec::Gzip => "gzip",
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Lz4 => "lz4",
            CompressionCodec::Zstd => "zstd",
        }
    }

    /// Parse a codec name, falling back to snappy for anything unrecognised.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown compression codec '{}', using '{}'",
                name,
                CompressionCodec::default()
            );
            CompressionCodec::default()
        })
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionCodec::None),
            "gzip" => Ok(CompressionCodec::Gzip),
            "snappy" => Ok(CompressionCodec::Snappy),
            "lz4" => Ok(CompressionCodec::Lz4),
            "zstd" => Ok(CompressionCodec::Zstd),
            other => Err(format!("unsupported compression codec: {other}")),
        }
    }
}
