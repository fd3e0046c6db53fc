/// PostgreSQL record backend
use super::{
    LookupKey, RecordBackend, RecordOutcome, RecordQuery, RecordRequest, StoreError, StoreResult,
    ACCOUNTS_COLLECTION,
};
use crate::models::{AccountPatch, UserAccount};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

#[derive(Clone)]
pub struct PgRecordBackend {
    pool: PgPool,
}

impl PgRecordBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get_one(&self, query: &RecordQuery) -> StoreResult<UserAccount> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        builder.push(ACCOUNTS_COLLECTION);
        push_filter(&mut builder, query);
        builder.push(" ORDER BY created_at LIMIT 1");

        builder
            .build_query_as::<UserAccount>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn get_many(&self, query: &RecordQuery) -> StoreResult<Vec<UserAccount>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        builder.push(ACCOUNTS_COLLECTION);
        push_filter(&mut builder, query);
        builder.push(" ORDER BY created_at");

        let accounts = builder
            .build_query_as::<UserAccount>()
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    async fn insert(&self, account: &UserAccount) -> StoreResult<()> {
        let mut builder = insert_query(account);
        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn edit(&self, query: &RecordQuery, patch: &AccountPatch) -> StoreResult<UserAccount> {
        let mut builder = edit_query(query, patch);
        builder
            .build_query_as::<UserAccount>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

fn insert_query(account: &UserAccount) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");
    builder.push(ACCOUNTS_COLLECTION);
    builder.push(
        " (id, username, real_name, password_hash, email, email_verified, \
         organisation_id, description, created_at, created_by, deleted) ",
    );
    builder.push_values(std::iter::once(account), |mut row, account| {
        row.push_bind(account.id)
            .push_bind(&account.username)
            .push_bind(&account.real_name)
            .push_bind(&account.password_hash)
            .push_bind(&account.email)
            .push_bind(account.email_verified)
            .push_bind(&account.organisation_id)
            .push_bind(&account.description)
            .push_bind(account.created_at)
            .push_bind(&account.created_by)
            .push_bind(account.deleted);
    });
    builder
}

/// Partial update: unset patch fields bind NULL and keep the stored value.
/// Only the oldest record matching `query` is touched.
fn edit_query(query: &RecordQuery, patch: &AccountPatch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
    builder.push(ACCOUNTS_COLLECTION);
    builder.push(" SET username = COALESCE(");
    builder.push_bind(patch.username.clone());
    builder.push(", username), real_name = COALESCE(");
    builder.push_bind(patch.real_name.clone());
    builder.push(", real_name), password_hash = COALESCE(");
    builder.push_bind(patch.password_hash.clone());
    builder.push(", password_hash), email = COALESCE(");
    builder.push_bind(patch.email.clone());
    builder.push(", email), email_verified = COALESCE(");
    builder.push_bind(patch.email_verified);
    builder.push(", email_verified), organisation_id = COALESCE(");
    builder.push_bind(patch.organisation_id.clone());
    builder.push(", organisation_id), description = COALESCE(");
    builder.push_bind(patch.description.clone());
    builder.push(", description), deleted = COALESCE(");
    builder.push_bind(patch.deleted);
    builder.push(", deleted) WHERE id = (SELECT id FROM ");
    builder.push(ACCOUNTS_COLLECTION);
    push_filter(&mut builder, query);
    builder.push(" ORDER BY created_at LIMIT 1) RETURNING *");
    builder
}

/// Appends the WHERE clause for `query`, including the soft-delete filter
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, query: &RecordQuery) {
    match &query.key {
        LookupKey::Id(id) => {
            builder.push(" WHERE id = ");
            builder.push_bind(*id);
        }
        LookupKey::Username(username) => {
            builder.push(" WHERE username = ");
            builder.push_bind(username.clone());
        }
        LookupKey::Organisation(organisation_id) => {
            builder.push(" WHERE organisation_id = ");
            builder.push_bind(organisation_id.clone());
        }
    }
    if !query.include_deleted {
        builder.push(" AND deleted = FALSE");
    }
}

#[async_trait]
impl RecordBackend for PgRecordBackend {
    async fn execute(&self, request: RecordRequest) -> StoreResult<RecordOutcome> {
        match request {
            RecordRequest::GetOne(query) => self.get_one(&query).await.map(RecordOutcome::One),
            RecordRequest::GetMany(query) => self.get_many(&query).await.map(RecordOutcome::Many),
            RecordRequest::Insert(account) => {
                self.insert(&account).await.map(|_| RecordOutcome::Inserted)
            }
            RecordRequest::Edit { query, patch } => {
                self.edit(&query, &patch).await.map(RecordOutcome::Edited)
            }
        }
    }
}
