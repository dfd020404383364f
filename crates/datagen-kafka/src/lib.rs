//! Kafka producers for generated benchmark tables.
//!
//! A [`TableProducer`] streams rows from a [`ColumnSet`](datagen_generator::ColumnSet)
//! to a single topic at a controlled rate, in one of three formats: Avro and
//! Protobuf (schemas published to a schema registry) or self-describing JSON.
//!
//! # Architecture
//!
//! ```text
//!   ColumnSet ──────────────┬─────────────────────────┐
//!                           ▼                         ▼
//!                 ┌──────────────────┐      ┌──────────────────┐
//!                 │  encoder/*.rs    │      │  TableProducer   │
//!                 │                  │      │  construction    │
//!                 │ - schema text    │─────►│ - cleanup_topic  │
//!                 │ - row encoding   │      │ - publish_schema │
//!                 └──────────────────┘      └────────┬─────────┘
//!                                                    │ produce()
//!                                                    ▼
//!                                          ┌──────────────────┐
//!                                          │  worker thread   │
//!                                          │ Maker::next ×N   │
//!                                          │ encode → sink    │
//!                                          └────────┬─────────┘
//!                                                   │
//!                            MetricsFuture ◄────────┤
//!                                                   ▼
//!                                              Kafka Topic
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use datagen_generator::TableDefinition;
//! use datagen_kafka::{ProducerConfig, RecordFormat, TableProducer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let columns = TableDefinition::from_file("stock_trans.yaml")?.to_column_set()?;
//!     let config = ProducerConfig::new("localhost:9092", "stock_trans")
//!         .with_schema_registry("http://localhost:8081");
//!
//!     let producer = TableProducer::connect(RecordFormat::Avro, config, columns).await?;
//!     let metrics = producer.produce(0, 1_000_000, 300)?.join().await?;
//!     println!("{} records at {:.0}/s", metrics.record_count, metrics.send_rate);
//!
//!     producer.close()?;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod args;
pub mod compression;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod producer;
pub mod registry;
pub mod sink;

// Re-exports for convenience
pub use admin::{cleanup_topic, KafkaTopicAdmin, TopicAdmin};
pub use args::{ProduceArgs, DEFAULT_ROW_COUNT};
pub use compression::CompressionCodec;
pub use encoder::{RecordEncoder, RecordFormat};
pub use error::ProducerError;
pub use metrics::{LoggingMetricsSink, Metrics, MetricsFuture, MetricsSink};
pub use producer::{ProducerConfig, TableProducer, PROGRESS_INTERVAL};
pub use registry::{publish_schema, HttpSchemaRegistry, SchemaRegistry, SchemaType};
pub use sink::{KafkaRecordSink, RecordSink};
