//! Record sinks the production loop publishes into.

use crate::compression::CompressionCodec;
use crate::error::Result;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{BaseProducer, BaseRecord, DefaultProducerContext, Producer};
use rdkafka::ClientConfig;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// Synchronous destination for serialized records.
///
/// Called from the producer's worker thread; implementations poll inline
/// rather than relying on a background thread.
pub trait RecordSink: Send + Sync {
    fn send(&self, topic: &str, payload: &[u8]) -> std::result::Result<(), KafkaError>;

    fn flush(&self, timeout: Duration) -> std::result::Result<(), KafkaError>;

    /// Release the client. Sends after close fail.
    fn close(&self, timeout: Duration) -> std::result::Result<(), KafkaError>;
}

/// [`RecordSink`] backed by an rdkafka [`BaseProducer`].
pub struct KafkaRecordSink {
    producer: RwLock<Option<BaseProducer<DefaultProducerContext>>>,
}

impl KafkaRecordSink {
    /// Fire-and-forget producer tuned for throughput: no acks, large
    /// batches, 128MB of client-side buffering.
    pub fn new(brokers: &str, compression: CompressionCodec) -> Result<Self> {
        let producer: BaseProducer<DefaultProducerContext> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("acks", "0")
            .set("compression.type", compression.as_str())
            .set("batch.size", "65536")
            .set("queue.buffering.max.kbytes", "131072")
            .set("linger.ms", "200")
            .set("message.timeout.ms", "30000")
            .create()?;

        info!(
            "Created Kafka producer for {} (compression: {})",
            brokers, compression
        );
        Ok(Self {
            producer: RwLock::new(Some(producer)),
        })
    }
}

fn closed_error() -> KafkaError {
    KafkaError::MessageProduction(RDKafkaErrorCode::State)
}

impl RecordSink for KafkaRecordSink {
    fn send(&self, topic: &str, payload: &[u8]) -> std::result::Result<(), KafkaError> {
        let guard = self.producer.read().unwrap_or_else(PoisonError::into_inner);
        let producer = guard.as_ref().ok_or_else(closed_error)?;

        let mut record = BaseRecord::<(), [u8]>::to(topic).payload(payload);
        loop {
            producer.poll(Duration::ZERO);
            match producer.send(record) {
                Ok(()) => return Ok(()),
                Err((KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull), rejected)) => {
                    // Local queue is full; serve delivery reports until it drains.
                    record = rejected;
                    producer.poll(Duration::from_millis(100));
                }
                Err((err, _)) => return Err(err),
            }
        }
    }

    fn flush(&self, timeout: Duration) -> std::result::Result<(), KafkaError> {
        let guard = self.producer.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(producer) => producer.flush(timeout),
            None => Ok(()),
        }
    }

    fn close(&self, timeout: Duration) -> std::result::Result<(), KafkaError> {
        let producer = self
            .producer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match producer {
            Some(producer) => {
                debug!("Closing Kafka producer");
                producer.flush(timeout)
            }
            None => Ok(()),
        }
    }
}
