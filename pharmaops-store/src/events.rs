use async_trait::async_trait;
use pharmaops_core::{AuditSink, BoxError};
use pharmaops_shared::{AuditEntry, AuditRecordedEvent};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
            Ok(delivery) => {
                info!(
                    "Sent message to {}/{}: partition {} offset {}",
                    topic, key, delivery.partition, delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to send message to {}: {}", topic, e);
                Err(e)
            }
        }
    }
}

/// Streams every audit entry to a Kafka topic, keyed by company
pub struct KafkaAuditSink {
    producer: EventProducer,
    topic: String,
}

impl KafkaAuditSink {
    pub fn new(producer: EventProducer, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl AuditSink for KafkaAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<(), BoxError> {
        let event = AuditRecordedEvent::new(entry.clone());
        let payload = serde_json::to_string(&event)?;
        self.producer.publish(&self.topic, &event.key(), &payload).await?;
        Ok(())
    }
}
