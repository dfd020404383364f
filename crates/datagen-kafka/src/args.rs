//! CLI argument definitions for table producers.

use crate::compression::CompressionCodec;
use crate::encoder::RecordFormat;
use crate::producer::ProducerConfig;
use clap::Args;
use std::time::Duration;

/// Rows produced when neither a record count nor a fixed range applies.
pub const DEFAULT_ROW_COUNT: u64 = 10_000;

/// Kafka producer arguments.
#[derive(Args, Clone, Debug)]
pub struct ProduceArgs {
    /// Kafka brokers (comma-separated, e.g., "localhost:9092")
    #[arg(long, env = "KAFKA_BROKERS", default_value = "localhost:9092")]
    pub kafka_brokers: String,

    /// Schema registry URL, required for avro and protobuf records
    #[arg(long, env = "SCHEMA_REGISTRY_URL")]
    pub schema_registry_url: Option<String>,

    /// Topic to produce to (defaults to the table name)
    #[arg(long)]
    pub topic: Option<String>,

    /// Record serialization format
    #[arg(long, value_enum, default_value = "avro")]
    pub format: RecordFormat,

    /// Compression codec: none, gzip, snappy, lz4 or zstd (unknown names use snappy)
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Pause between rows in milliseconds (0 or less only yields)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub row_pause_millis: i64,

    /// Records to produce (0 = largest range when fixed, otherwise the default row count)
    #[arg(long, default_value = "0")]
    pub max_records: u64,

    /// Stop producing after this many seconds
    #[arg(long, default_value = "3600")]
    pub max_duration_secs: u64,

    /// Seconds to wait for production to finish before giving up
    #[arg(long, default_value = "7200")]
    pub completion_timeout_secs: u64,

    /// Generate values incrementally instead of randomly
    #[arg(long)]
    pub fixed: bool,
}

impl ProduceArgs {
    /// Producer configuration for `table`, honouring the topic override.
    pub fn producer_config(&self, table: &str) -> ProducerConfig {
        let topic = self.topic.as_deref().unwrap_or(table);
        let mut config = ProducerConfig::new(&self.kafka_brokers, topic)
            .with_compression(CompressionCodec::parse_lenient(&self.compression));
        if let Some(url) = &self.schema_registry_url {
            config = config.with_schema_registry(url);
        }
        config
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}
