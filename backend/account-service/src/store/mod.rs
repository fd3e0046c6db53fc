/// Record store adapter
///
/// The only component touching durable state. Each operation is described by a
/// [`RecordRequest`] variant and executed by a [`RecordBackend`]; the
/// [`RecordStore`] wrapper bounds every call by a deadline and unpacks the
/// outcome into a typed result.
///
/// Reads exclude soft-deleted records unless the query opts in with
/// [`RecordQuery::including_deleted`].
use crate::models::{AccountPatch, UserAccount};
use async_trait::async_trait;
use resilience::with_timeout;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordBackend;
pub use postgres::PgRecordBackend;

/// Name of the collection (table) holding account records
pub const ACCOUNTS_COLLECTION: &str = "user_accounts";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("duplicate unique field: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Internal(other.to_string()),
        }
    }
}

/// Field a query selects on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(Uuid),
    Username(String),
    Organisation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub key: LookupKey,
    pub include_deleted: bool,
}

impl RecordQuery {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            key: LookupKey::Id(id),
            include_deleted: false,
        }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            key: LookupKey::Username(username.into()),
            include_deleted: false,
        }
    }

    pub fn by_organisation(organisation_id: impl Into<String>) -> Self {
        Self {
            key: LookupKey::Organisation(organisation_id.into()),
            include_deleted: false,
        }
    }

    /// Also match soft-deleted records (maintenance reads only)
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn matches(&self, account: &UserAccount) -> bool {
        if account.deleted && !self.include_deleted {
            return false;
        }
        match &self.key {
            LookupKey::Id(id) => account.id == *id,
            LookupKey::Username(username) => account.username == *username,
            LookupKey::Organisation(org) => account.organisation_id == *org,
        }
    }
}

/// One store operation, tagged by kind
#[derive(Debug, Clone)]
pub enum RecordRequest {
    GetOne(RecordQuery),
    GetMany(RecordQuery),
    Insert(UserAccount),
    /// Applies `patch` to the first record matching `query`
    Edit {
        query: RecordQuery,
        patch: AccountPatch,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    GetOne,
    GetMany,
    Insert,
    Edit,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::GetOne => "get_one",
            RequestKind::GetMany => "get_many",
            RequestKind::Insert => "insert",
            RequestKind::Edit => "edit",
        };
        f.write_str(name)
    }
}

impl RecordRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            RecordRequest::GetOne(_) => RequestKind::GetOne,
            RecordRequest::GetMany(_) => RequestKind::GetMany,
            RecordRequest::Insert(_) => RequestKind::Insert,
            RecordRequest::Edit { .. } => RequestKind::Edit,
        }
    }
}

/// Result payload of a [`RecordRequest`]; the variant mirrors the request kind
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    One(UserAccount),
    Many(Vec<UserAccount>),
    Inserted,
    Edited(UserAccount),
}

/// A concrete store. Implementations must be safe to call concurrently from
/// many in-flight requests over one shared connection pool.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    async fn execute(&self, request: RecordRequest) -> StoreResult<RecordOutcome>;
}

/// Deadline-bounded adapter shared by all request handlers
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn RecordBackend>,
    deadline: Duration,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn RecordBackend>, deadline: Duration) -> Self {
        Self { backend, deadline }
    }

    /// Runs one request under the deadline. Store failures are logged here
    /// and nowhere else.
    async fn run(&self, request: RecordRequest) -> StoreResult<RecordOutcome> {
        let kind = request.kind();
        let result = match with_timeout(self.deadline, self.backend.execute(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(StoreError::Unavailable(format!(
                "{} exceeded deadline of {:?}",
                kind, self.deadline
            ))),
        };

        if let Err(e @ (StoreError::Unavailable(_) | StoreError::Internal(_))) = &result {
            tracing::error!(operation = %kind, error = %e, "Record store request failed");
        }
        result
    }

    pub async fn get_one_record(&self, query: RecordQuery) -> StoreResult<UserAccount> {
        match self.run(RecordRequest::GetOne(query)).await? {
            RecordOutcome::One(account) => Ok(account),
            other => Err(mismatched(RequestKind::GetOne, &other)),
        }
    }

    pub async fn get_many_records(&self, query: RecordQuery) -> StoreResult<Vec<UserAccount>> {
        match self.run(RecordRequest::GetMany(query)).await? {
            RecordOutcome::Many(accounts) => Ok(accounts),
            other => Err(mismatched(RequestKind::GetMany, &other)),
        }
    }

    pub async fn insert_record(&self, account: UserAccount) -> StoreResult<()> {
        match self.run(RecordRequest::Insert(account)).await? {
            RecordOutcome::Inserted => Ok(()),
            other => Err(mismatched(RequestKind::Insert, &other)),
        }
    }

    pub async fn edit_record(&self, query: RecordQuery, patch: AccountPatch) -> StoreResult<UserAccount> {
        match self.run(RecordRequest::Edit { query, patch }).await? {
            RecordOutcome::Edited(account) => Ok(account),
            other => Err(mismatched(RequestKind::Edit, &other)),
        }
    }
}

fn mismatched(kind: RequestKind, outcome: &RecordOutcome) -> StoreError {
    let got = match outcome {
        RecordOutcome::One(_) => "one",
        RecordOutcome::Many(_) => "many",
        RecordOutcome::Inserted => "inserted",
        RecordOutcome::Edited(_) => "edited",
    };
    StoreError::Internal(format!("backend answered {} request with {} outcome", kind, got))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;

    #[derive(Debug)]
    struct PgFailure {
        unique: bool,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for PgFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message())
        }
    }

    impl StdError for PgFailure {}

    impl DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::CheckViolation
            }
        }
    }

    fn database(unique: bool, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgFailure { unique, constraint }))
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = database(true, Some("idx_user_accounts_live_username"));
        match StoreError::from(err) {
            StoreError::Conflict(constraint) => {
                assert_eq!(constraint, "idx_user_accounts_live_username")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_other_database_errors_are_internal() {
        let err = database(false, Some("user_accounts_check"));
        assert!(matches!(StoreError::from(err), StoreError::Internal(_)));
    }

    #[test]
    fn test_connectivity_errors_are_unavailable() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        for err in [
            sqlx::Error::PoolTimedOut,
            sqlx::Error::PoolClosed,
            sqlx::Error::WorkerCrashed,
            sqlx::Error::Io(refused),
        ] {
            assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
        }
    }

    #[test]
    fn test_protocol_error_is_internal() {
        let err = sqlx::Error::Protocol("unexpected message".to_string());
        assert!(matches!(StoreError::from(err), StoreError::Internal(_)));
    }
}
