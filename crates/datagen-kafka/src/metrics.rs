//! Production run metrics and the handle that delivers them.

use crate::error::{ProducerError, Result};
use serde::Serialize;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::info;

/// Metrics from one production run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub topic: String,
    pub duration_secs: f64,
    pub record_count: u64,
    /// Records per second; 0 when the run took no measurable time.
    pub send_rate: f64,
}

impl Metrics {
    pub fn new(topic: &str, duration: Duration, record_count: u64) -> Self {
        let duration_secs = duration.as_secs_f64();
        let send_rate = if duration_secs > 0.0 {
            record_count as f64 / duration_secs
        } else {
            0.0
        };

        Self {
            topic: topic.to_string(),
            duration_secs,
            record_count,
            send_rate,
        }
    }
}

/// Receives metrics keyed by topic.
pub trait MetricsSink: Send + Sync {
    fn record(&self, metrics: &Metrics);
}

/// [`MetricsSink`] that writes each run to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMetricsSink;

impl MetricsSink for LoggingMetricsSink {
    fn record(&self, metrics: &Metrics) {
        info!(
            topic = %metrics.topic,
            "duration.secs={:.3} record.count={} send.rate={:.2}",
            metrics.duration_secs,
            metrics.record_count,
            metrics.send_rate
        );
    }
}

/// Pending outcome of a production run.
///
/// The outcome is delivered once: after a successful `wait` or `join`, the
/// handle reports [`ProducerError::WorkerLost`].
#[derive(Debug)]
pub struct MetricsFuture {
    receiver: Receiver<Result<Metrics>>,
}

impl MetricsFuture {
    pub(crate) fn new(receiver: Receiver<Result<Metrics>>) -> Self {
        Self { receiver }
    }

    /// Block until the run finishes or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Result<Metrics> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(ProducerError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ProducerError::WorkerLost),
        }
    }

    /// Await the run without blocking the async runtime.
    pub async fn join(self) -> Result<Metrics> {
        let receiver = self.receiver;
        tokio::task::spawn_blocking(move || receiver.recv())
            .await
            .map_err(|_| ProducerError::WorkerLost)?
            .map_err(|_| ProducerError::WorkerLost)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_send_rate() {
        let metrics = Metrics::new("trades", Duration::from_secs(10), 1000);
        assert_eq!(metrics.send_rate, 100.0);
        assert_eq!(metrics.duration_secs, 10.0);
    }

    #[test]
    fn test_zero_duration_rate() {
        let metrics = Metrics::new("trades", Duration::ZERO, 1000);
        assert_eq!(metrics.send_rate, 0.0);
    }

    #[test]
    fn test_wait_timeout_then_result() {
        let (tx, rx) = mpsc::channel();
        let future = MetricsFuture::new(rx);

        let err = future.wait(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, ProducerError::Timeout(_)));

        tx.send(Ok(Metrics::new("t", Duration::from_secs(1), 5))).unwrap();
        assert_eq!(future.wait(Duration::from_secs(1)).unwrap().record_count, 5);
    }

    #[test]
    fn test_wait_after_worker_dropped() {
        let (tx, rx) = mpsc::channel::<Result<Metrics>>();
        drop(tx);
        let err = MetricsFuture::new(rx).wait(Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProducerError::WorkerLost));
    }

    #[tokio::test]
    async fn test_join() {
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(Metrics::new("t", Duration::from_secs(2), 8))).unwrap();
        let metrics = MetricsFuture::new(rx).join().await.unwrap();
        assert_eq!(metrics.send_rate, 4.0);
    }

    #[test]
    fn test_join_from_sync_caller() {
        let (tx, rx) = mpsc::channel();
        tx.send(Err(ProducerError::Closed("trades".to_string())))
            .unwrap();
        let err = tokio_test::block_on(MetricsFuture::new(rx).join()).unwrap_err();
        assert!(matches!(err, ProducerError::Closed(topic) if topic == "trades"));
    }
}
