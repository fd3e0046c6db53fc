/// Account Directory Service Library
///
/// Owns the user-account lifecycle for the backend and exposes it over gRPC.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `error`: Error taxonomy and gRPC status mapping
/// - `grpc`: gRPC server implementation
/// - `models`: Account records, patches and sanitized projections
/// - `security`: Argon2id password hashing
/// - `services`: Account directory orchestration and event publishing
/// - `store`: Record store adapter (PostgreSQL and in-memory backends)
/// - `validators`: Input validation
pub mod config;
pub mod error;
pub mod grpc;
pub mod models;
pub mod security;
pub mod services;
pub mod store;
pub mod validators;

// Re-export commonly used types
pub use error::{AccountError, Result};
pub use grpc::AccountDirectoryServer;
