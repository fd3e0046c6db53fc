use crate::store::StoreError;
use thiserror::Error;
use tonic::{Code, Status};

pub type Result<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    /// Credential mismatch. Deliberately carries no detail.
    #[error("Invalid credentials")]
    Authentication,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Convert to gRPC Status for wire protocol
    pub fn to_status(&self) -> Status {
        match self {
            AccountError::Validation(msg) => {
                Status::new(Code::InvalidArgument, format!("Validation error: {}", msg))
            }
            AccountError::NotFound => Status::new(Code::NotFound, "User not found"),
            AccountError::Authentication => {
                Status::new(Code::Unauthenticated, "Invalid credentials")
            }
            AccountError::Conflict(_) => {
                Status::new(Code::AlreadyExists, "Username or email already exists")
            }
            AccountError::Unavailable(_) => {
                Status::new(Code::Unavailable, "Service temporarily unavailable")
            }
            AccountError::Internal(_) => {
                // Don't leak internal details
                Status::new(Code::Internal, "Internal server error")
            }
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AccountError::NotFound,
            StoreError::Conflict(msg) => AccountError::Conflict(msg),
            StoreError::Unavailable(msg) => AccountError::Unavailable(msg),
            StoreError::Internal(msg) => AccountError::Internal(msg),
        }
    }
}

// gRPC Status conversion
impl From<AccountError> for Status {
    fn from(err: AccountError) -> Self {
        err.to_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AccountError::NotFound.to_status().code(), Code::NotFound);
        assert_eq!(
            AccountError::Authentication.to_status().code(),
            Code::Unauthenticated
        );
        assert_eq!(
            AccountError::Unavailable("db down".into()).to_status().code(),
            Code::Unavailable
        );
        assert_eq!(
            AccountError::Conflict("dup".into()).to_status().code(),
            Code::AlreadyExists
        );
        assert_eq!(
            AccountError::Validation("bad".into()).to_status().code(),
            Code::InvalidArgument
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let status = AccountError::Internal("connection string postgres://secret".into()).to_status();
        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("postgres"));

        let status = AccountError::Unavailable("pool timed out at 10.0.0.3".into()).to_status();
        assert!(!status.message().contains("10.0.0.3"));
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(AccountError::from(StoreError::NotFound), AccountError::NotFound));
        assert!(matches!(
            AccountError::from(StoreError::Unavailable("x".into())),
            AccountError::Unavailable(_)
        ));
        assert!(matches!(
            AccountError::from(StoreError::Conflict("x".into())),
            AccountError::Conflict(_)
        ));
    }
}
