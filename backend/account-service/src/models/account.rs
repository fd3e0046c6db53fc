use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Persisted user account record
///
/// `id` and the creation metadata are assigned once by `CreateUser` and never
/// change. `password_hash` is an Argon2id PHC string and never leaves the
/// service; use [`AccountProfile`] for anything returned to callers.
#[derive(Clone, PartialEq, Eq, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub real_name: String,
    pub password_hash: String,
    pub email: String,
    pub email_verified: bool,
    pub organisation_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    /// Soft-delete marker
    pub deleted: bool,
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("real_name", &self.real_name)
            .field("password_hash", &"<redacted>")
            .field("email", &self.email)
            .field("email_verified", &self.email_verified)
            .field("organisation_id", &self.organisation_id)
            .field("description", &self.description)
            .field("created_at", &self.created_at)
            .field("created_by", &self.created_by)
            .field("deleted", &self.deleted)
            .finish()
    }
}

/// Sanitized projection served to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub username: String,
    pub real_name: String,
    pub email: String,
    pub organisation_id: String,
    pub description: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for AccountProfile {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            real_name: account.real_name.clone(),
            email: account.email.clone(),
            organisation_id: account.organisation_id.clone(),
            description: account.description.clone(),
            email_verified: account.email_verified,
            created_at: account.created_at,
        }
    }
}

impl From<UserAccount> for AccountProfile {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username,
            real_name: account.real_name,
            email: account.email,
            organisation_id: account.organisation_id,
            description: account.description,
            email_verified: account.email_verified,
            created_at: account.created_at,
        }
    }
}

/// Input to `CreateUser` (plaintext password, not yet hashed)
#[derive(Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub real_name: String,
    pub email: String,
    pub organisation_id: String,
    pub description: String,
    /// Creating account; `None` for self-registration
    pub created_by: Option<String>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("organisation_id", &self.organisation_id)
            .field("created_by", &self.created_by)
            .finish_non_exhaustive()
    }
}

/// Input to `EditUser`; `None` leaves a field untouched
#[derive(Clone, Default)]
pub struct AccountEdit {
    pub username: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub organisation_id: Option<String>,
    pub description: Option<String>,
    pub password: Option<String>,
    pub email_verified: Option<bool>,
}

impl AccountEdit {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.real_name.is_none()
            && self.email.is_none()
            && self.organisation_id.is_none()
            && self.description.is_none()
            && self.password.is_none()
            && self.email_verified.is_none()
    }
}

impl fmt::Debug for AccountEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountEdit")
            .field("username", &self.username)
            .field("real_name", &self.real_name)
            .field("email", &self.email)
            .field("organisation_id", &self.organisation_id)
            .field("description", &self.description)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email_verified", &self.email_verified)
            .finish()
    }
}

/// Store-level patch for the mutable fields of a record
///
/// There is deliberately no way to express a change of `id`, `created_at` or
/// `created_by`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub username: Option<String>,
    pub real_name: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub organisation_id: Option<String>,
    pub description: Option<String>,
    pub deleted: Option<bool>,
}

impl AccountPatch {
    /// Soft-delete patch
    pub fn soft_delete() -> Self {
        Self {
            deleted: Some(true),
            ..Self::default()
        }
    }

    pub fn apply(&self, account: &mut UserAccount) {
        if let Some(username) = &self.username {
            account.username = username.clone();
        }
        if let Some(real_name) = &self.real_name {
            account.real_name = real_name.clone();
        }
        if let Some(password_hash) = &self.password_hash {
            account.password_hash = password_hash.clone();
        }
        if let Some(email) = &self.email {
            account.email = email.clone();
        }
        if let Some(email_verified) = self.email_verified {
            account.email_verified = email_verified;
        }
        if let Some(organisation_id) = &self.organisation_id {
            account.organisation_id = organisation_id.clone();
        }
        if let Some(description) = &self.description {
            account.description = description.clone();
        }
        if let Some(deleted) = self.deleted {
            account.deleted = deleted;
        }
    }
}
