//! Configuration for the Credential Gateway
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Account directory endpoint
    pub account_service: AccountServiceConfig,

    /// Session token configuration
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountServiceConfig {
    pub url: String,
    /// Seconds allowed for one verification call
    pub timeout: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub lifetime_seconds: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("lifetime_seconds", &self.lifetime_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("Invalid SERVER_PORT")?,
            },
            account_service: AccountServiceConfig {
                url: env::var("ACCOUNT_SERVICE_URL")
                    .unwrap_or_else(|_| "http://account-service:50051".to_string()),
                timeout: env::var("ACCOUNT_SERVICE_TIMEOUT")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("Invalid ACCOUNT_SERVICE_TIMEOUT")?
                    .unwrap_or_else(|| resilience::rpc_config().timeout.duration.as_secs()),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "auth-gateway".to_string()),
                lifetime_seconds: env::var("JWT_LIFETIME_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .context("Invalid JWT_LIFETIME_SECONDS")?,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl AccountServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl JwtConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_seconds)
    }
}
