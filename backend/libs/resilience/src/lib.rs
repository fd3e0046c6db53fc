/// Deadline helpers for outbound calls
///
/// Every call that leaves the process (document store, broker, internal RPC)
/// is bounded by an explicit deadline. Exceeding it cancels that one future and
/// surfaces [`TimeoutError::Elapsed`] instead of blocking the caller.
///
/// # Example: Store Query with Deadline
///
/// ```rust,no_run
/// use resilience::{presets, with_timeout};
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::store_config();
///
///     match with_timeout(config.timeout.duration, async { Ok::<_, String>(()) }).await {
///         Ok(Ok(())) => {}
///         Ok(Err(store_error)) => eprintln!("query failed: {}", store_error),
///         Err(elapsed) => eprintln!("{}", elapsed),
///     }
/// }
/// ```

pub mod presets;
pub mod timeout;

pub use presets::{broker_config, rpc_config, store_config, ServiceConfig};
pub use timeout::{with_timeout, TimeoutConfig, TimeoutError};
