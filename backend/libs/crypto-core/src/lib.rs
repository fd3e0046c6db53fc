//! Shared security primitives for the account backend
//!
//! - `jwt`: session token issuance and validation (HS256, injected secret)
//! - `correlation`: correlation-id constants and helpers
//! - `grpc_correlation`: tonic interceptor forwarding the correlation id
//! - `kafka_correlation`: rdkafka header injection
pub mod correlation;
pub mod grpc_correlation;
pub mod jwt;
pub mod kafka_correlation;

pub use jwt::{SessionClaims, SessionSubject, TokenError, TokenIssuer};
