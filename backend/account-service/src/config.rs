//! Configuration management for Account Service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)
//!
//! Settings are read once at startup and handed to constructors; nothing below
//! `main` reads the environment.

use crate::security::HashingCost;
use crate::services::PublisherConfig;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Accepted store deadline, in seconds
pub const STORE_DEADLINE_SECS: RangeInclusive<u64> = 5..=10;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub kafka: KafkaSettings,
    pub password: PasswordSettings,
    pub server: ServerSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            database: DatabaseSettings::from_env()?,
            kafka: KafkaSettings::from_env()?,
            password: PasswordSettings::from_env()?,
            server: ServerSettings::from_env()?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout: u64,
    /// Deadline, in seconds, for a single record store operation
    pub operation_timeout: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        let operation_timeout = env::var("STORE_OPERATION_TIMEOUT")
            .ok()
            .map(|v| v.parse())
            .transpose()
            .context("Invalid STORE_OPERATION_TIMEOUT")?
            .unwrap_or_else(|| resilience::store_config().timeout.duration.as_secs());
        ensure!(
            STORE_DEADLINE_SECS.contains(&operation_timeout),
            "STORE_OPERATION_TIMEOUT must be between {} and {} seconds, got {}",
            STORE_DEADLINE_SECS.start(),
            STORE_DEADLINE_SECS.end(),
            operation_timeout
        );

        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            acquire_timeout: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
            operation_timeout,
        })
    }

    pub fn operation_deadline(&self) -> Duration {
        Duration::from_secs(self.operation_timeout)
    }
}

/// Kafka event settings; an empty broker list disables publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaSettings {
    pub brokers: Vec<String>,
    pub topic: String,
    pub partition: i32,
    pub producer_timeout: u64,
    pub queue_capacity: usize,
}

impl KafkaSettings {
    fn from_env() -> Result<Self> {
        let brokers = env::var("KAFKA_BROKERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            brokers,
            topic: env::var("KAFKA_TOPIC").unwrap_or_else(|_| "user-events".to_string()),
            partition: env::var("KAFKA_PARTITION")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("Invalid KAFKA_PARTITION")?,
            producer_timeout: env::var("KAFKA_PRODUCER_TIMEOUT")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Invalid KAFKA_PRODUCER_TIMEOUT")?
                .unwrap_or_else(|| resilience::broker_config().timeout.duration.as_secs()),
            queue_capacity: env::var("EVENT_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .context("Invalid EVENT_QUEUE_CAPACITY")?,
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.brokers.is_empty()
    }

    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig {
            queue_capacity: self.queue_capacity,
            publish_timeout: Duration::from_secs(self.producer_timeout),
        }
    }
}

/// Argon2id cost settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordSettings {
    fn from_env() -> Result<Self> {
        let defaults = HashingCost::default();
        Ok(Self {
            memory_kib: env::var("PASSWORD_HASH_MEMORY_KIB")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Invalid PASSWORD_HASH_MEMORY_KIB")?
                .unwrap_or(defaults.memory_kib),
            iterations: env::var("PASSWORD_HASH_ITERATIONS")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Invalid PASSWORD_HASH_ITERATIONS")?
                .unwrap_or(defaults.iterations),
            parallelism: env::var("PASSWORD_HASH_PARALLELISM")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Invalid PASSWORD_HASH_PARALLELISM")?
                .unwrap_or(defaults.parallelism),
        })
    }

    pub fn cost(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

/// gRPC server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub grpc_port: u16,
}

impl ServerSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            grpc_port: env::var("GRPC_PORT")
                .unwrap_or_else(|_| "50051".to_string())
                .parse()
                .context("Invalid GRPC_PORT")?,
        })
    }

    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }
}
