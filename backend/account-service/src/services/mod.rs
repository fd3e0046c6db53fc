/// Service layer for account-service
///
/// - Account directory (account lifecycle and credential verification)
/// - Event publisher (bounded queue + background worker)
/// - Kafka event sink (broker delivery)
pub mod directory;
pub mod events;
pub mod kafka_events;

pub use directory::AccountDirectory;
pub use events::{
    spawn_event_publisher, EventPublisher, EventSink, OutboundEvent, PublishError,
    PublisherConfig,
};
pub use kafka_events::KafkaEventSink;
