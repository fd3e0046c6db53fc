//! Correlation ID utilities for distributed tracing
//!
//! Manages correlation IDs across HTTP, gRPC, and Kafka boundaries.
//!
//! ```text
//! Client HTTP Request
//!   ↓ (x-correlation-id header, generated if absent)
//! Credential Gateway
//!   ↓ (correlation-id gRPC metadata)
//! Account Directory Service
//!   ↓ (correlation-id Kafka message header)
//! Broker
//! ```
use tonic::metadata::MetadataMap;
use uuid::Uuid;

/// gRPC metadata key for correlation ID
pub const GRPC_CORRELATION_ID_KEY: &str = "correlation-id";

/// HTTP header for correlation ID
pub const HTTP_CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Kafka message header for correlation ID
pub const KAFKA_CORRELATION_ID_HEADER: &str = "correlation-id";

/// Upper bound on accepted inbound ids; anything longer is replaced
const MAX_CORRELATION_ID_LEN: usize = 128;

/// Generate a fresh correlation id
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Accept a caller-supplied id if it is printable ASCII of sane length
pub fn sanitize(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty()
        || trimmed.len() > MAX_CORRELATION_ID_LEN
        || !trimmed.chars().all(|c| c.is_ascii_graphic())
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// Read the correlation id from incoming gRPC metadata
pub fn from_metadata(metadata: &MetadataMap) -> Option<String> {
    metadata
        .get(GRPC_CORRELATION_ID_KEY)
        .and_then(|val| val.to_str().ok())
        .and_then(sanitize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_uuid() {
        let id = new_correlation_id();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(" req-42 "), Some("req-42".to_string()));
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("has space"), None);
        assert_eq!(sanitize(&"x".repeat(129)), None);
    }

    #[test]
    fn test_from_metadata() {
        let mut metadata = MetadataMap::new();
        assert_eq!(from_metadata(&metadata), None);

        metadata.insert(GRPC_CORRELATION_ID_KEY, "abc-123".parse().unwrap());
        assert_eq!(from_metadata(&metadata), Some("abc-123".to_string()));
    }
}
