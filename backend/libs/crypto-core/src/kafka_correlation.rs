//! Kafka correlation ID helpers for rdkafka
use crate::correlation::KAFKA_CORRELATION_ID_HEADER;
use rdkafka::message::{Header, OwnedHeaders};

pub fn inject_headers(headers: OwnedHeaders, correlation_id: &str) -> OwnedHeaders {
    headers.insert(Header {
        key: KAFKA_CORRELATION_ID_HEADER,
        value: Some(correlation_id.as_bytes()),
    })
}
