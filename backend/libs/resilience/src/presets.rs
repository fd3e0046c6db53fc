/// Deadline presets for the outbound calls this backend makes
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Configuration bundle for a dependency type
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout: TimeoutConfig,
}

/// Document store operations (single fetch, multi fetch, insert, edit)
///
/// - Timeout: 5s
pub fn store_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(5),
        },
    }
}

/// Internal gRPC calls (gateway -> account directory)
///
/// - Timeout: 10s
pub fn rpc_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(10),
        },
    }
}

/// Kafka producer operations
///
/// - Timeout: 5s
pub fn broker_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(5),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config() {
        assert_eq!(store_config().timeout.duration, Duration::from_secs(5));
    }

    #[test]
    fn test_rpc_config() {
        assert_eq!(rpc_config().timeout.duration, Duration::from_secs(10));
    }

    #[test]
    fn test_broker_config() {
        assert_eq!(broker_config().timeout.duration, Duration::from_secs(5));
    }
}
