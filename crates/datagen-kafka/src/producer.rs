//! Rate-controlled table producer.
//!
//! A [`TableProducer`] owns one topic. Construction resets the topic and, for
//! registry-backed formats, republishes the record schema. Each
//! [`produce`](TableProducer::produce) call runs the generation loop on a
//! dedicated worker thread and hands back a [`MetricsFuture`].

use crate::admin::{cleanup_topic, KafkaTopicAdmin, TopicAdmin};
use crate::compression::CompressionCodec;
use crate::encoder::{
    self, AvroEncoder, JsonEncoder, ProtobufEncoder, RecordEncoder, RecordFormat,
};
use crate::error::{ProducerError, Result};
use crate::metrics::{Metrics, MetricsFuture};
use crate::registry::{publish_schema, HttpSchemaRegistry, SchemaRegistry, SchemaType};
use crate::sink::{KafkaRecordSink, RecordSink};
use datagen_generator::{ColumnSet, Maker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Records between progress log lines.
pub const PROGRESS_INTERVAL: u64 = 10_000_000;

/// Default time allowed for buffered records to reach the broker.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a [`TableProducer`].
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub brokers: String,
    /// Required for registry-backed formats.
    pub schema_registry_url: Option<String>,
    pub topic: String,
    pub compression: CompressionCodec,
    pub flush_timeout: Duration,
}

impl ProducerConfig {
    pub fn new(brokers: &str, topic: &str) -> Self {
        Self {
            brokers: brokers.to_string(),
            schema_registry_url: None,
            topic: topic.to_string(),
            compression: CompressionCodec::default(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    pub fn with_schema_registry(mut self, url: &str) -> Self {
        self.schema_registry_url = Some(url.to_string());
        self
    }

    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }
}

/// Streams generated rows of one table to its topic.
///
/// # Example
///
/// ```rust,ignore
/// let config = ProducerConfig::new("localhost:9092", "stock_trans")
///     .with_schema_registry("http://localhost:8081");
/// let producer = TableProducer::connect(RecordFormat::Avro, config, columns).await?;
///
/// let future = producer.produce(0, 1_000_000, 60)?;
/// let metrics = future.join().await?;
/// producer.close()?;
/// ```
pub struct TableProducer {
    topic: String,
    format: RecordFormat,
    columns: Arc<ColumnSet>,
    encoder: Arc<dyn RecordEncoder>,
    sink: Arc<dyn RecordSink>,
    closed: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    flush_timeout: Duration,
}

impl TableProducer {
    /// Connect to the broker and registry, reset the topic, and publish the
    /// schema for `format`.
    pub async fn connect(
        format: RecordFormat,
        config: ProducerConfig,
        columns: ColumnSet,
    ) -> Result<Self> {
        let admin = KafkaTopicAdmin::new(&config.brokers)?;
        let registry = match (&config.schema_registry_url, format.registry_backed()) {
            (Some(url), true) => Some(HttpSchemaRegistry::new(url)?),
            (None, true) => {
                return Err(ProducerError::SchemaRegistry(format!(
                    "a schema registry URL is required for {format} records"
                )))
            }
            (_, false) => None,
        };
        let sink = Arc::new(KafkaRecordSink::new(&config.brokers, config.compression)?);

        Self::from_parts(
            format,
            &config.topic,
            columns,
            &admin,
            registry.as_ref().map(|r| r as &dyn SchemaRegistry),
            sink,
        )
        .await
        .map(|producer| producer.with_flush_timeout(config.flush_timeout))
    }

    /// Build a producer over explicit collaborators.
    ///
    /// The sink is closed if preparing the topic or schema fails.
    pub async fn from_parts(
        format: RecordFormat,
        topic: &str,
        columns: ColumnSet,
        admin: &dyn TopicAdmin,
        registry: Option<&dyn SchemaRegistry>,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self> {
        info!(
            "Preparing {} producer for topic '{}' ({} columns)",
            format,
            topic,
            columns.count()
        );

        let prepared = async {
            cleanup_topic(admin, topic).await?;
            build_encoder(format, topic, &columns, registry).await
        }
        .await;

        let encoder = match prepared {
            Ok(encoder) => encoder,
            Err(err) => {
                if let Err(close_err) = sink.close(DEFAULT_FLUSH_TIMEOUT) {
                    warn!("Failed to close sink for '{}': {}", topic, close_err);
                }
                return Err(err);
            }
        };

        Ok(Self {
            topic: topic.to_string(),
            format,
            columns: Arc::new(columns),
            encoder,
            sink,
            closed: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        })
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Start streaming rows on the worker thread.
    ///
    /// The loop stops once `max_record_count` records are sent, once more
    /// than `max_duration_secs` have elapsed after a send, or at the first
    /// row after [`close`](Self::close). A `row_pause_millis` of zero or less
    /// yields between rows instead of sleeping. Errors inside the loop are
    /// reported only through the returned future.
    pub fn produce(
        &self,
        row_pause_millis: i64,
        max_record_count: u64,
        max_duration_secs: u64,
    ) -> Result<MetricsFuture> {
        if self.is_closed() {
            return Err(ProducerError::Closed(self.topic.clone()));
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ProducerError::AlreadyRunning(self.topic.clone()));
        }

        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = worker.take() {
            if previous.join().is_err() {
                warn!("Previous worker for '{}' panicked", self.topic);
            }
        }

        let run = ProductionRun {
            topic: self.topic.clone(),
            makers: self.columns.makers(),
            encoder: Arc::clone(&self.encoder),
            sink: Arc::clone(&self.sink),
            closed: Arc::clone(&self.closed),
            flush_timeout: self.flush_timeout,
            row_pause_millis,
            max_record_count,
            max_duration_secs,
        };
        let running = Arc::clone(&self.running);
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name(format!("produce-{}", self.topic))
            .spawn(move || {
                let outcome = run.execute();
                running.store(false, Ordering::SeqCst);
                // The caller may have dropped the future.
                let _ = tx.send(outcome);
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                Ok(MetricsFuture::new(rx))
            }
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                Err(err.into())
            }
        }
    }

    /// Stop any running loop, then flush and close the sink.
    ///
    /// Only the first call does anything; later calls return `Ok(())`.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Closing producer for topic '{}'", self.topic);

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                warn!("Worker for '{}' panicked", self.topic);
            }
        }

        let flushed = self.sink.flush(self.flush_timeout);
        self.sink.close(self.flush_timeout)?;
        flushed?;
        Ok(())
    }
}

impl Drop for TableProducer {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close producer for '{}': {}", self.topic, e);
        }
    }
}

async fn build_encoder(
    format: RecordFormat,
    topic: &str,
    columns: &ColumnSet,
    registry: Option<&dyn SchemaRegistry>,
) -> Result<Arc<dyn RecordEncoder>> {
    let require_registry = || {
        registry.ok_or_else(|| {
            ProducerError::SchemaRegistry(format!("no schema registry for {format} records"))
        })
    };

    let encoder: Arc<dyn RecordEncoder> = match format {
        RecordFormat::Avro => {
            let schema = encoder::avro::schema_for(topic, columns);
            // Parse locally before touching the registry.
            let avro = AvroEncoder::new(&schema, 0)?;
            let id = publish_schema(require_registry()?, topic, &schema, SchemaType::Avro).await?;
            Arc::new(avro.with_schema_id(id))
        }
        RecordFormat::Protobuf => {
            let schema = encoder::proto::schema_for(topic, columns);
            let id =
                publish_schema(require_registry()?, topic, &schema, SchemaType::Protobuf).await?;
            Arc::new(ProtobufEncoder::new(columns, id))
        }
        RecordFormat::Json => {
            debug!(
                "JSON type spec for '{}': {}",
                topic,
                encoder::json::type_spec(columns)
            );
            Arc::new(JsonEncoder::new(columns))
        }
    };
    Ok(encoder)
}

/// State moved onto the worker thread for one `produce` call.
struct ProductionRun {
    topic: String,
    makers: Vec<Maker>,
    encoder: Arc<dyn RecordEncoder>,
    sink: Arc<dyn RecordSink>,
    closed: Arc<AtomicBool>,
    flush_timeout: Duration,
    row_pause_millis: i64,
    max_record_count: u64,
    max_duration_secs: u64,
}

impl ProductionRun {
    fn execute(mut self) -> Result<Metrics> {
        info!(
            "Producing up to {} records to '{}' for at most {}s",
            self.max_record_count, self.topic, self.max_duration_secs
        );

        let start = Instant::now();
        let mut record_count = 0u64;
        let sent = self.send_rows(start, &mut record_count);

        // Flush what was sent even when the loop failed.
        let flushed = self.sink.flush(self.flush_timeout).map_err(|source| {
            ProducerError::Publish {
                topic: self.topic.clone(),
                source,
            }
        });
        sent?;
        flushed?;

        let metrics = Metrics::new(&self.topic, start.elapsed(), record_count);
        info!(
            "Produced {} records to '{}' in {:.3}s",
            metrics.record_count, metrics.topic, metrics.duration_secs
        );
        Ok(metrics)
    }

    fn send_rows(&mut self, start: Instant, record_count: &mut u64) -> Result<()> {
        let max_millis = u128::from(self.max_duration_secs) * 1000;
        let mut row = Vec::with_capacity(self.makers.len());

        while !self.closed.load(Ordering::SeqCst) && *record_count < self.max_record_count {
            row.clear();
            for maker in &mut self.makers {
                row.push(maker.next(*record_count, self.max_record_count)?);
            }

            let payload = self.encoder.encode(&row)?;
            self.sink
                .send(&self.topic, &payload)
                .map_err(|source| ProducerError::Publish {
                    topic: self.topic.clone(),
                    source,
                })?;

            if self.row_pause_millis <= 0 {
                thread::yield_now();
            } else {
                thread::sleep(Duration::from_millis(self.row_pause_millis.unsigned_abs()));
            }

            *record_count += 1;
            if *record_count % PROGRESS_INTERVAL == 0 {
                info!("Produced {} records to '{}'", record_count, self.topic);
            }

            if start.elapsed().as_millis() > max_millis {
                debug!("Duration limit reached for '{}'", self.topic);
                break;
            }
        }
        Ok(())
    }
}
