/// Kafka event sink for account-service
use super::events::{EventSink, OutboundEvent, PublishError};
use async_trait::async_trait;
use crypto_core::kafka_correlation::inject_headers;
use rdkafka::error::KafkaError;
use rdkafka::message::OwnedHeaders;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use std::time::Duration;
use tracing::warn;

/// Publishes domain events to a fixed topic and partition
#[derive(Clone)]
pub struct KafkaEventSink {
    producer: FutureProducer,
    topic: String,
    partition: i32,
    queue_timeout: Duration,
}

impl KafkaEventSink {
    /// Create a new Kafka event sink
    ///
    /// ## Arguments
    ///
    /// * `brokers` - Comma-separated list of Kafka brokers
    /// * `topic` - Topic receiving every account event
    /// * `partition` - Fixed partition within `topic`
    /// * `timeout` - Upper bound for local queueing and broker acknowledgement
    pub fn new(
        brokers: &str,
        topic: &str,
        partition: i32,
        timeout: Duration,
    ) -> Result<Self, KafkaError> {
        let producer = rdkafka::config::ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", "account-service")
            .set("message.timeout.ms", timeout.as_millis().to_string())
            .create::<FutureProducer>()?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
            partition,
            queue_timeout: timeout,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl EventSink for KafkaEventSink {
    async fn publish(&self, outbound: &OutboundEvent) -> Result<(), PublishError> {
        let payload = outbound.event.encode();
        let key = outbound.event.kind().as_str();

        let mut record = FutureRecord::to(&self.topic)
            .partition(self.partition)
            .key(key)
            .payload(&payload);
        if let Some(correlation_id) = outbound.correlation_id.as_deref() {
            record = record.headers(inject_headers(OwnedHeaders::new(), correlation_id));
        }

        self.producer
            .send(record, self.queue_timeout)
            .await
            .map_err(|(error, _)| {
                warn!("Failed to send Kafka event to topic {}: {:?}", self.topic, error);
                classify(error)
            })?;

        Ok(())
    }
}

fn classify(error: KafkaError) -> PublishError {
    match error.rdkafka_error_code() {
        Some(RDKafkaErrorCode::MessageTimedOut)
        | Some(RDKafkaErrorCode::QueueFull)
        | Some(RDKafkaErrorCode::AllBrokersDown)
        | Some(RDKafkaErrorCode::BrokerTransportFailure) => {
            PublishError::Unavailable(error.to_string())
        }
        _ => PublishError::Rejected(error.to_string()),
    }
}
