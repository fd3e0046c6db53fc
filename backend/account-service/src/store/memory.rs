/// In-process record backend
///
/// Mirrors the PostgreSQL backend semantics (soft-delete filter, unique live
/// usernames and emails, first-match edits) so the directory can run without a
/// database in tests and local tooling.
use super::{RecordBackend, RecordOutcome, RecordQuery, RecordRequest, StoreError, StoreResult};
use crate::models::{AccountPatch, UserAccount};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryRecordBackend {
    records: Arc<RwLock<Vec<UserAccount>>>,
    latency: Option<Duration>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryRecordBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Toggle simulated outage; while unavailable every call fails
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Raw snapshot, soft-deleted records included
    pub async fn snapshot(&self) -> Vec<UserAccount> {
        self.records.read().await.clone()
    }

    fn conflict(
        records: &[UserAccount],
        skip: Option<Uuid>,
        username: &str,
        email: &str,
    ) -> Option<StoreError> {
        let live = records
            .iter()
            .filter(|r| !r.deleted && Some(r.id) != skip);
        for record in live {
            if record.username == username {
                return Some(StoreError::Conflict("username".to_string()));
            }
            if record.email == email {
                return Some(StoreError::Conflict("email".to_string()));
            }
        }
        None
    }

    async fn insert(&self, account: UserAccount) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == account.id) {
            return Err(StoreError::Conflict("id".to_string()));
        }
        if !account.deleted {
            if let Some(err) = Self::conflict(&records, None, &account.username, &account.email) {
                return Err(err);
            }
        }
        records.push(account);
        Ok(())
    }

    async fn edit(&self, query: &RecordQuery, patch: &AccountPatch) -> StoreResult<UserAccount> {
        let mut records = self.records.write().await;
        let index = first_match(&records, query).ok_or(StoreError::NotFound)?;

        let mut updated = records[index].clone();
        patch.apply(&mut updated);
        if !updated.deleted {
            if let Some(err) =
                Self::conflict(&records, Some(updated.id), &updated.username, &updated.email)
            {
                return Err(err);
            }
        }
        records[index] = updated.clone();
        Ok(updated)
    }
}

/// Index of the oldest record matching `query`
fn first_match(records: &[UserAccount], query: &RecordQuery) -> Option<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| query.matches(r))
        .min_by_key(|(_, r)| r.created_at)
        .map(|(i, _)| i)
}

#[async_trait]
impl RecordBackend for MemoryRecordBackend {
    async fn execute(&self, request: RecordRequest) -> StoreResult<RecordOutcome> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory backend offline".to_string()));
        }

        match request {
            RecordRequest::GetOne(query) => {
                let records = self.records.read().await;
                first_match(&records, &query)
                    .map(|i| RecordOutcome::One(records[i].clone()))
                    .ok_or(StoreError::NotFound)
            }
            RecordRequest::GetMany(query) => {
                let records = self.records.read().await;
                let mut matched: Vec<UserAccount> =
                    records.iter().filter(|r| query.matches(r)).cloned().collect();
                matched.sort_by_key(|r| r.created_at);
                Ok(RecordOutcome::Many(matched))
            }
            RecordRequest::Insert(account) => {
                self.insert(account).await.map(|_| RecordOutcome::Inserted)
            }
            RecordRequest::Edit { query, patch } => {
                self.edit(&query, &patch).await.map(RecordOutcome::Edited)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use chrono::Utc;

    fn account(username: &str, email: &str, org: &str) -> UserAccount {
        UserAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            real_name: String::new(),
            password_hash: "hash".to_string(),
            email: email.to_string(),
            email_verified: false,
            organisation_id: org.to_string(),
            description: String::new(),
            created_at: Utc::now(),
            created_by: "admin".to_string(),
            deleted: false,
        }
    }

    fn store(backend: MemoryRecordBackend) -> RecordStore {
        RecordStore::new(Arc::new(backend), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_insert_then_get_one() {
        let store = store(MemoryRecordBackend::new());
        let alice = account("alice", "a@x.com", "org1");
        store.insert_record(alice.clone()).await.unwrap();

        let found = store
            .get_one_record(RecordQuery::by_username("alice"))
            .await
            .unwrap();
        assert_eq!(found, alice);
    }

    #[tokio::test]
    async fn test_get_one_missing_is_not_found() {
        let store = store(MemoryRecordBackend::new());
        let result = store.get_one_record(RecordQuery::by_id(Uuid::new_v4())).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_many_filters_organisation() {
        let store = store(MemoryRecordBackend::new());
        store.insert_record(account("a1", "a1@x.com", "org1")).await.unwrap();
        store.insert_record(account("a2", "a2@x.com", "org1")).await.unwrap();
        store.insert_record(account("b1", "b1@x.com", "org2")).await.unwrap();

        let org1 = store
            .get_many_records(RecordQuery::by_organisation("org1"))
            .await
            .unwrap();
        assert_eq!(org1.len(), 2);
        assert!(org1.iter().all(|a| a.organisation_id == "org1"));
    }

    #[tokio::test]
    async fn test_soft_deleted_hidden_unless_requested() {
        let store = store(MemoryRecordBackend::new());
        let alice = account("alice", "a@x.com", "org1");
        store.insert_record(alice.clone()).await.unwrap();
        store
            .edit_record(RecordQuery::by_id(alice.id), AccountPatch::soft_delete())
            .await
            .unwrap();

        let hidden = store.get_one_record(RecordQuery::by_id(alice.id)).await;
        assert!(matches!(hidden, Err(StoreError::NotFound)));

        let raw = store
            .get_one_record(RecordQuery::by_id(alice.id).including_deleted())
            .await
            .unwrap();
        assert!(raw.deleted);
    }

    #[tokio::test]
    async fn test_duplicate_live_username_conflicts() {
        let store = store(MemoryRecordBackend::new());
        store.insert_record(account("alice", "a@x.com", "org1")).await.unwrap();
        let result = store.insert_record(account("alice", "other@x.com", "org1")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_username_reusable_after_soft_delete() {
        let store = store(MemoryRecordBackend::new());
        let first = account("alice", "a@x.com", "org1");
        store.insert_record(first.clone()).await.unwrap();
        store
            .edit_record(RecordQuery::by_id(first.id), AccountPatch::soft_delete())
            .await
            .unwrap();

        store.insert_record(account("alice", "a@x.com", "org1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_missing_is_not_found() {
        let store = store(MemoryRecordBackend::new());
        let result = store
            .edit_record(RecordQuery::by_id(Uuid::new_v4()), AccountPatch::default())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_latency_beyond_deadline_is_unavailable() {
        let backend = MemoryRecordBackend::new().with_latency(Duration::from_millis(200));
        let store = RecordStore::new(Arc::new(backend), Duration::from_millis(20));

        let result = store.get_one_record(RecordQuery::by_username("alice")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_offline_backend_is_unavailable() {
        let backend = MemoryRecordBackend::new();
        backend.set_available(false);
        let store = store(backend.clone());

        let result = store.insert_record(account("alice", "a@x.com", "org1")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        backend.set_available(true);
        store.insert_record(account("alice", "a@x.com", "org1")).await.unwrap();
    }
}
