//! gRPC client for the account directory
//!
//! ## Key points:
//! - Connection via `connect_lazy()`; HTTP/2 multiplexing handles concurrency
//! - Timeout configuration (connect + request), plus an outer deadline per call
//! - Correlation id forwarded as gRPC metadata
//! - Failures reduced to [`VerifyError`]; the caller never sees the raw status

use async_trait::async_trait;
use crypto_core::grpc_correlation::{CorrelationId, GrpcCorrelationInjector};
use crypto_core::SessionSubject;
use resilience::with_timeout;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;
use tracing::warn;

// Proto module definitions from build.rs
pub mod proto {
    pub mod account_service {
        tonic::include_proto!("account.account_service.v1");
    }
}

use proto::account_service::account_service_client::AccountServiceClient;
use proto::account_service::{UserResponse, VerifyUserPasswordRequest};

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("credentials rejected")]
    Rejected,
    #[error("account service unavailable: {0}")]
    Unavailable(String),
    #[error("account service did not answer within {0:?}")]
    Timeout(Duration),
    #[error("malformed account service response: {0}")]
    Malformed(String),
}

/// Checks a username/password pair and returns the verified identity
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(
        &self,
        username: &str,
        password: &str,
        correlation_id: &str,
    ) -> Result<SessionSubject, VerifyError>;
}

impl From<UserResponse> for SessionSubject {
    fn from(user: UserResponse) -> Self {
        Self {
            username: user.username,
            display_name: user.real_name,
            email: user.email,
            organisation_id: user.organisation_id,
            description: user.description,
        }
    }
}

/// [`CredentialVerifier`] backed by the account-service `VerifyUserPassword` RPC
#[derive(Clone)]
pub struct GrpcCredentialVerifier {
    channel: Channel,
    timeout: Duration,
}

impl GrpcCredentialVerifier {
    /// Create a verifier for `endpoint`
    ///
    /// # Configuration:
    /// - **Connect timeout**: 5 seconds
    /// - **Request timeout**: `timeout`
    /// - **Keep-alive**: 60 seconds, 20 second ack timeout
    /// - **Connection mode**: Lazy (connects on first use, not during construction)
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.to_string())?
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .http2_keep_alive_interval(Duration::from_secs(60))
            .keep_alive_timeout(Duration::from_secs(20))
            .keep_alive_while_idle(true)
            .connect_lazy();

        Ok(Self { channel, timeout })
    }

    fn client(
        &self,
    ) -> AccountServiceClient<
        tonic::service::interceptor::InterceptedService<Channel, GrpcCorrelationInjector>,
    > {
        AccountServiceClient::with_interceptor(self.channel.clone(), GrpcCorrelationInjector)
    }
}

#[async_trait]
impl CredentialVerifier for GrpcCredentialVerifier {
    async fn verify(
        &self,
        username: &str,
        password: &str,
        correlation_id: &str,
    ) -> Result<SessionSubject, VerifyError> {
        let mut client = self.client();
        let mut request = tonic::Request::new(VerifyUserPasswordRequest {
            username: username.to_string(),
            pw: password.to_string(),
        });
        request
            .extensions_mut()
            .insert(CorrelationId(correlation_id.to_string()));

        let response = with_timeout(self.timeout, client.verify_user_password(request))
            .await
            .map_err(|_| VerifyError::Timeout(self.timeout))?;

        match response {
            Ok(response) => response
                .into_inner()
                .user
                .map(SessionSubject::from)
                .ok_or_else(|| VerifyError::Malformed("missing user".to_string())),
            Err(status) if status.code() == Code::Unauthenticated => Err(VerifyError::Rejected),
            Err(status) => {
                warn!(
                    code = ?status.code(),
                    correlation_id = %correlation_id,
                    "VerifyUserPassword call failed"
                );
                Err(VerifyError::Unavailable(status.message().to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_to_subject() {
        let subject = SessionSubject::from(UserResponse {
            id: "id-1".to_string(),
            username: "alice".to_string(),
            real_name: "Alice A".to_string(),
            email: "a@x.com".to_string(),
            organisation_id: "org1".to_string(),
            description: "bio".to_string(),
            email_verified: false,
            created_at: 0,
        });
        assert_eq!(subject.username, "alice");
        assert_eq!(subject.display_name, "Alice A");
        assert_eq!(subject.organisation_id, "org1");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(GrpcCredentialVerifier::new("not a uri", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let verifier =
            GrpcCredentialVerifier::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = verifier.verify("alice", "secret123", "corr").await;
        assert!(matches!(
            result,
            Err(VerifyError::Unavailable(_)) | Err(VerifyError::Timeout(_))
        ));
    }
}
