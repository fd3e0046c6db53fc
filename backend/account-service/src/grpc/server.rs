/// gRPC server implementation for account-service
///
/// Implements all RPCs from account_service.proto:
/// - Lifecycle: CreateUser, GetUser, EditUser, DeleteUser
/// - Credentials: VerifyUserPassword
use crate::error::AccountError;
use crate::models::{AccountEdit, AccountProfile, NewAccount};
use crate::services::AccountDirectory;
use crypto_core::correlation;
use crypto_core::grpc_correlation::CorrelationId;
use tonic::{Request, Response, Status};
use tracing::{info, warn};

// Import generated protobuf types
pub mod proto {
    pub mod account_service {
        tonic::include_proto!("account.account_service.v1");
    }
}

use proto::account_service::account_service_server::AccountService;
use proto::account_service::*;

/// Account directory gRPC server
#[derive(Clone)]
pub struct AccountDirectoryServer {
    directory: AccountDirectory,
}

impl AccountDirectoryServer {
    pub fn new(directory: AccountDirectory) -> Self {
        Self { directory }
    }
}

impl From<AccountProfile> for UserResponse {
    fn from(profile: AccountProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            username: profile.username,
            real_name: profile.real_name,
            email: profile.email,
            organisation_id: profile.organisation_id,
            description: profile.description,
            email_verified: profile.email_verified,
            created_at: profile.created_at.timestamp(),
        }
    }
}

impl From<CreateUserRequest> for NewAccount {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.pw,
            real_name: req.real_name,
            email: req.email,
            organisation_id: req.organisation_id,
            description: req.description,
            created_by: Some(req.created_by).filter(|c| !c.is_empty()),
        }
    }
}

/// Id set by the server interceptor, falling back to raw metadata
fn correlation_id<T>(request: &Request<T>) -> Option<String> {
    request
        .extensions()
        .get::<CorrelationId>()
        .map(|c| c.0.clone())
        .or_else(|| correlation::from_metadata(request.metadata()))
}

#[tonic::async_trait]
impl AccountService for AccountDirectoryServer {
    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> std::result::Result<Response<UserResponse>, Status> {
        let correlation_id = correlation_id(&request);
        let req = request.into_inner();
        info!(
            username = %req.username,
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
            "CreateUser"
        );

        let profile = self
            .directory
            .create_user(NewAccount::from(req), correlation_id)
            .await
            .map_err(to_status)?;

        Ok(Response::new(UserResponse::from(profile)))
    }

    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> std::result::Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let profile = self.directory.get_user(&req.id).await.map_err(to_status)?;
        Ok(Response::new(UserResponse::from(profile)))
    }

    async fn edit_user(
        &self,
        request: Request<EditUserRequest>,
    ) -> std::result::Result<Response<UserResponse>, Status> {
        let req = request.into_inner();
        let edit = AccountEdit {
            username: req.username,
            real_name: req.real_name,
            email: req.email,
            organisation_id: req.organisation_id,
            description: req.description,
            password: req.pw,
            email_verified: req.email_verified,
        };

        let profile = self
            .directory
            .edit_user(&req.id, edit)
            .await
            .map_err(to_status)?;
        Ok(Response::new(UserResponse::from(profile)))
    }

    async fn delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> std::result::Result<Response<DeleteUserResponse>, Status> {
        let req = request.into_inner();
        self.directory
            .delete_user(&req.id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(DeleteUserResponse { successful: true }))
    }

    async fn verify_user_password(
        &self,
        request: Request<VerifyUserPasswordRequest>,
    ) -> std::result::Result<Response<VerifyUserPasswordResponse>, Status> {
        let correlation_id = correlation_id(&request);
        let req = request.into_inner();

        match self
            .directory
            .verify_user_password(&req.username, &req.pw)
            .await
        {
            Ok(profile) => Ok(Response::new(VerifyUserPasswordResponse {
                user: Some(UserResponse::from(profile)),
            })),
            Err(e) => {
                warn!(
                    username = %req.username,
                    correlation_id = correlation_id.as_deref().unwrap_or("-"),
                    "Password verification failed"
                );
                Err(to_status(e))
            }
        }
    }
}

fn to_status(err: AccountError) -> Status {
    err.to_status()
}
