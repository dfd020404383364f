//! Topic administration used before a production run.

use crate::error::{ProducerError, Result};
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions};
use rdkafka::client::DefaultClientContext;
use rdkafka::metadata::Metadata;
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
const DELETE_WAIT: Duration = Duration::from_secs(30);
const DELETE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Broker operations needed to reset a topic.
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    async fn topic_exists(&self, topic: &str) -> Result<bool>;

    async fn delete_topic(&self, topic: &str) -> Result<()>;

    /// Messages currently retained across all partitions; 0 for a missing topic.
    async fn message_count(&self, topic: &str) -> Result<i64>;
}

/// Delete `topic` if present and verify it no longer holds messages.
pub async fn cleanup_topic(admin: &dyn TopicAdmin, topic: &str) -> Result<()> {
    if admin.topic_exists(topic).await? {
        info!("Deleting existing topic '{}'", topic);
        admin.delete_topic(topic).await?;

        let deadline = Instant::now() + DELETE_WAIT;
        while admin.topic_exists(topic).await? && Instant::now() < deadline {
            tokio::time::sleep(DELETE_POLL_INTERVAL).await;
        }
    }

    let remaining = admin.message_count(topic).await?;
    if remaining > 0 {
        return Err(ProducerError::TopicCleanup {
            topic: topic.to_string(),
            remaining,
        });
    }

    debug!("Topic '{}' is empty", topic);
    Ok(())
}

/// [`TopicAdmin`] backed by an rdkafka admin client.
pub struct KafkaTopicAdmin {
    admin: Arc<AdminClient<DefaultClientContext>>,
}

impl KafkaTopicAdmin {
    pub fn new(brokers: &str) -> Result<Self> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .create()?;
        Ok(Self {
            admin: Arc::new(admin),
        })
    }

    /// Run a blocking librdkafka call on the blocking pool.
    async fn blocking<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&AdminClient<DefaultClientContext>) -> Result<T> + Send + 'static,
    {
        let admin = Arc::clone(&self.admin);
        tokio::task::spawn_blocking(move || call(&admin))
            .await
            .map_err(|_| ProducerError::WorkerLost)?
    }

    async fn metadata(&self, topic: &str) -> Result<Metadata> {
        let topic = topic.to_string();
        self.blocking(move |admin| {
            Ok(admin
                .inner()
                .fetch_metadata(Some(topic.as_str()), METADATA_TIMEOUT)?)
        })
        .await
    }
}

#[async_trait]
impl TopicAdmin for KafkaTopicAdmin {
    async fn topic_exists(&self, topic: &str) -> Result<bool> {
        let metadata = self.metadata(topic).await?;

        Ok(metadata
            .topics()
            .iter()
            .any(|t| t.name() == topic && t.error().is_none() && !t.partitions().is_empty()))
    }

    async fn delete_topic(&self, topic: &str) -> Result<()> {
        let opts = AdminOptions::new()
            .operation_timeout(Some(Duration::from_secs(30)))
            .request_timeout(Some(Duration::from_secs(30)));

        for result in self.admin.delete_topics(&[topic], &opts).await? {
            match result {
                Ok(name) => info!("Topic '{}' deleted", name),
                Err((name, RDKafkaErrorCode::UnknownTopicOrPartition)) => {
                    debug!("Topic '{}' does not exist, nothing to delete", name);
                }
                Err((name, code)) => {
                    warn!("Failed to delete topic '{}': {}", name, code);
                    return Err(KafkaError::AdminOp(code).into());
                }
            }
        }
        Ok(())
    }

    async fn message_count(&self, topic: &str) -> Result<i64> {
        let metadata = self.metadata(topic).await?;
        let partitions: Vec<i32> = metadata
            .topics()
            .iter()
            .filter(|t| t.name() == topic && t.error().is_none())
            .flat_map(|t| t.partitions().iter().map(|p| p.id()))
            .collect();

        let topic = topic.to_string();
        self.blocking(move |admin| {
            let mut total = 0;
            for partition in partitions {
                let (low, high) = admin
                    .inner()
                    .fetch_watermarks(&topic, partition, METADATA_TIMEOUT)?;
                total += high - low;
            }
            Ok(total)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeAdmin {
        exists: Mutex<bool>,
        count_after_delete: i64,
        deleted: Mutex<u32>,
    }

    impl FakeAdmin {
        fn new(exists: bool, count_after_delete: i64) -> Self {
            Self {
                exists: Mutex::new(exists),
                count_after_delete,
                deleted: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl TopicAdmin for FakeAdmin {
        async fn topic_exists(&self, _topic: &str) -> Result<bool> {
            Ok(*self.exists.lock().unwrap())
        }

        async fn delete_topic(&self, _topic: &str) -> Result<()> {
            *self.exists.lock().unwrap() = false;
            *self.deleted.lock().unwrap() += 1;
            Ok(())
        }

        async fn message_count(&self, _topic: &str) -> Result<i64> {
            Ok(self.count_after_delete)
        }
    }

    #[tokio::test]
    async fn test_existing_topic_is_deleted() {
        let admin = FakeAdmin::new(true, 0);
        cleanup_topic(&admin, "trades").await.unwrap();
        assert_eq!(*admin.deleted.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_topic_is_not_deleted() {
        let admin = FakeAdmin::new(false, 0);
        cleanup_topic(&admin, "trades").await.unwrap();
        assert_eq!(*admin.deleted.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_librdkafka_calls_run_off_the_runtime_thread() {
        // Client creation does not contact the broker.
        let admin = KafkaTopicAdmin::new("127.0.0.1:1").unwrap();
        let caller = std::thread::current().id();

        let worker = admin
            .blocking(|_| Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker, caller);
    }

    #[tokio::test]
    async fn test_leftover_messages_fail_cleanup() {
        let admin = FakeAdmin::new(true, 7);
        let err = cleanup_topic(&admin, "trades").await.unwrap_err();
        assert!(matches!(
            err,
            ProducerError::TopicCleanup { ref topic, remaining: 7 } if topic == "trades"
        ));
    }
}
