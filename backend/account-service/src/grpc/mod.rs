/// gRPC server module for account-service
///
/// Exports:
/// - AccountDirectoryServer: gRPC server implementation
/// - proto: Generated protobuf types from account_service.proto
pub mod server;

pub use server::proto;
pub use server::AccountDirectoryServer;
