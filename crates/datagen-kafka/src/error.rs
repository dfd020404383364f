//! Error types for table producers.

use datagen_generator::GeneratorError;
use rdkafka::error::KafkaError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while preparing a topic or producing records.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Topic '{topic}' still holds {remaining} messages after deletion")]
    TopicCleanup { topic: String, remaining: i64 },

    #[error("Failed to publish to topic '{topic}': {source}")]
    Publish {
        topic: String,
        #[source]
        source: KafkaError,
    },

    #[error("Schema registry error: {0}")]
    SchemaRegistry(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Producer for topic '{0}' is closed")]
    Closed(String),

    #[error("Producer for topic '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Timed out after {0:?} waiting for production to finish")]
    Timeout(Duration),

    #[error("Production worker exited without reporting a result")]
    WorkerLost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProducerError {
    fn from(err: reqwest::Error) -> Self {
        ProducerError::SchemaRegistry(err.to_string())
    }
}

impl From<apache_avro::Error> for ProducerError {
    fn from(err: apache_avro::Error) -> Self {
        ProducerError::Encoding(err.to_string())
    }
}

impl From<protobuf::Error> for ProducerError {
    fn from(err: protobuf::Error) -> Self {
        ProducerError::Encoding(err.to_string())
    }
}

impl From<serde_json::Error> for ProducerError {
    fn from(err: serde_json::Error) -> Self {
        ProducerError::Encoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProducerError>;
