/// Asynchronous domain-event publication
///
/// Request handlers hand events to [`EventPublisher::dispatch`], which only
/// enqueues. A single background worker drains the bounded queue and delivers
/// each event to the configured [`EventSink`] under the broker deadline.
/// Delivery failures end at the log; they never reach the request that
/// produced the event.
use async_trait::async_trait;
use event_schema::DomainEvent;
use resilience::with_timeout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker unavailable: {0}")]
    Unavailable(String),
    #[error("broker rejected event: {0}")]
    Rejected(String),
}

/// A domain event plus the correlation id of the request that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    pub event: DomainEvent,
    pub correlation_id: Option<String>,
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: &OutboundEvent) -> Result<(), PublishError>;
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub queue_capacity: usize,
    pub publish_timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            publish_timeout: resilience::broker_config().timeout.duration,
        }
    }
}

/// Cheap, cloneable handle used by request handlers
#[derive(Clone, Debug)]
pub struct EventPublisher {
    tx: Option<mpsc::Sender<OutboundEvent>>,
}

impl EventPublisher {
    /// Publisher that drops every event (no broker configured)
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Enqueue an event without waiting for delivery
    ///
    /// Returns `false` when the event was dropped.
    pub fn dispatch(&self, event: DomainEvent, correlation_id: Option<String>) -> bool {
        let Some(tx) = &self.tx else {
            debug!(event_kind = %event.kind(), "Event publishing disabled; dropping event");
            return false;
        };

        match tx.try_send(OutboundEvent {
            event,
            correlation_id,
        }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(outbound)) => {
                warn!(
                    event_kind = %outbound.event.kind(),
                    "Event queue full; dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(outbound)) => {
                warn!(
                    event_kind = %outbound.event.kind(),
                    "Event publisher stopped; dropping event"
                );
                false
            }
        }
    }
}

/// Spawn the background publisher worker
///
/// The worker exits once every [`EventPublisher`] clone has been dropped and
/// the queue is drained.
pub fn spawn_event_publisher(
    sink: Arc<dyn EventSink>,
    config: PublisherConfig,
) -> (EventPublisher, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<OutboundEvent>(config.queue_capacity.max(1));

    info!(
        queue_capacity = config.queue_capacity,
        publish_timeout_ms = %config.publish_timeout.as_millis(),
        "Starting account event publisher"
    );

    let handle = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let kind = outbound.event.kind();
            match with_timeout(config.publish_timeout, sink.publish(&outbound)).await {
                Ok(Ok(())) => debug!(event_kind = %kind, "Event published"),
                Ok(Err(e)) => error!(event_kind = %kind, error = %e, "Failed to publish event"),
                Err(e) => error!(event_kind = %kind, error = %e, "Event publish timed out"),
            }
        }
        info!("Account event publisher stopped");
    });

    (EventPublisher { tx: Some(tx) }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<OutboundEvent>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn publish(&self, event: &OutboundEvent) -> Result<(), PublishError> {
            self.seen.lock().await.push(event.clone());
            Ok(())
        }
    }

    struct StuckSink;

    #[async_trait]
    impl EventSink for StuckSink {
        async fn publish(&self, _event: &OutboundEvent) -> Result<(), PublishError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn registration(email: &str) -> DomainEvent {
        DomainEvent::user_registration(email).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_delivers_to_sink() {
        let sink = Arc::new(RecordingSink::default());
        let (publisher, handle) = spawn_event_publisher(sink.clone(), PublisherConfig::default());

        assert!(publisher.dispatch(registration("a@x.com"), Some("corr-1".to_string())));
        drop(publisher);
        handle.await.unwrap();

        let seen = sink.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event.encode(), "USER_REGISTRATION|a@x.com");
        assert_eq!(seen[0].correlation_id.as_deref(), Some("corr-1"));
    }

    #[tokio::test]
    async fn test_disabled_publisher_drops() {
        let publisher = EventPublisher::disabled();
        assert!(!publisher.is_enabled());
        assert!(!publisher.dispatch(registration("a@x.com"), None));
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let config = PublisherConfig {
            queue_capacity: 1,
            publish_timeout: Duration::from_secs(120),
        };
        let (publisher, _handle) = spawn_event_publisher(Arc::new(StuckSink), config);

        // First event is taken by the worker and stalls in the sink; the second
        // fills the queue; the third must be refused.
        publisher.dispatch(registration("1@x.com"), None);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(publisher.dispatch(registration("2@x.com"), None));
        assert!(!publisher.dispatch(registration("3@x.com"), None));
    }

    #[tokio::test]
    async fn test_publish_deadline_does_not_stop_worker() {
        let config = PublisherConfig {
            queue_capacity: 4,
            publish_timeout: Duration::from_millis(20),
        };
        let (publisher, handle) = spawn_event_publisher(Arc::new(StuckSink), config);

        publisher.dispatch(registration("1@x.com"), None);
        publisher.dispatch(registration("2@x.com"), None);
        drop(publisher);

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("worker should drain after publish deadlines")
            .unwrap();
    }
}
