/// Account directory: lifecycle operations over the record store
use crate::error::{AccountError, Result};
use crate::models::{AccountEdit, AccountPatch, AccountProfile, NewAccount, UserAccount};
use crate::security::CredentialHasher;
use crate::services::EventPublisher;
use crate::store::{RecordQuery, RecordStore, StoreError};
use crate::validators;
use chrono::Utc;
use event_schema::DomainEvent;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates the record store, the credential hasher and the event
/// publisher. All handles are injected; cloning is cheap.
#[derive(Clone)]
pub struct AccountDirectory {
    store: RecordStore,
    hasher: CredentialHasher,
    events: EventPublisher,
}

impl AccountDirectory {
    pub fn new(store: RecordStore, hasher: CredentialHasher, events: EventPublisher) -> Self {
        Self {
            store,
            hasher,
            events,
        }
    }

    /// Create an account and announce its registration
    ///
    /// The registration event is dispatched only after the record is
    /// persisted, and its delivery never affects the result.
    pub async fn create_user(
        &self,
        new_account: NewAccount,
        correlation_id: Option<String>,
    ) -> Result<AccountProfile> {
        validate_new_account(&new_account)?;

        let password_hash = self.hasher.hash(new_account.password).await?;
        let id = Uuid::new_v4();
        let created_by = new_account
            .created_by
            .filter(|creator| !creator.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        let account = UserAccount {
            id,
            username: new_account.username,
            real_name: new_account.real_name,
            password_hash,
            email: new_account.email,
            email_verified: false,
            organisation_id: new_account.organisation_id,
            description: new_account.description,
            created_at: Utc::now(),
            created_by,
            deleted: false,
        };

        self.store.insert_record(account.clone()).await?;
        info!(user_id = %account.id, username = %account.username, "Account created");

        match DomainEvent::user_registration(&account.email) {
            Ok(event) => {
                self.events.dispatch(event, correlation_id);
            }
            Err(e) => warn!(user_id = %account.id, error = %e, "Registration event not encodable"),
        }

        Ok(AccountProfile::from(account))
    }

    pub async fn get_user(&self, id: &str) -> Result<AccountProfile> {
        let id = parse_account_id(id)?;
        let account = self.store.get_one_record(RecordQuery::by_id(id)).await?;
        Ok(AccountProfile::from(account))
    }

    /// Check a username/password pair
    ///
    /// Every failure collapses into [`AccountError::Authentication`]. Unknown
    /// usernames still pay for one hash verification.
    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<AccountProfile> {
        let account = match self
            .store
            .get_one_record(RecordQuery::by_username(username))
            .await
        {
            Ok(account) => account,
            Err(e) => {
                if !matches!(e, StoreError::NotFound) {
                    warn!(error = %e, "Credential lookup failed");
                }
                self.hasher.burn_verification(password.to_string()).await;
                return Err(AccountError::Authentication);
            }
        };

        match self
            .hasher
            .verify(password.to_string(), account.password_hash.clone())
            .await
        {
            Ok(true) => {
                info!(user_id = %account.id, "Credentials verified");
                Ok(AccountProfile::from(account))
            }
            Ok(false) => Err(AccountError::Authentication),
            Err(e) => {
                warn!(user_id = %account.id, error = %e, "Stored credential unusable");
                Err(AccountError::Authentication)
            }
        }
    }

    /// Replace mutable fields; `id` and creation metadata never change
    pub async fn edit_user(&self, id: &str, edit: AccountEdit) -> Result<AccountProfile> {
        let id = parse_account_id(id)?;
        validate_edit(&edit)?;

        if edit.is_empty() {
            let account = self.store.get_one_record(RecordQuery::by_id(id)).await?;
            return Ok(AccountProfile::from(account));
        }

        let password_hash = match edit.password {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };
        let patch = AccountPatch {
            username: edit.username,
            real_name: edit.real_name,
            password_hash,
            email: edit.email,
            email_verified: edit.email_verified,
            organisation_id: edit.organisation_id,
            description: edit.description,
            deleted: None,
        };

        let account = self.store.edit_record(RecordQuery::by_id(id), patch).await?;
        info!(user_id = %account.id, "Account updated");
        Ok(AccountProfile::from(account))
    }

    /// Soft-delete: the record stays in the store, hidden from every read
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let id = parse_account_id(id)?;
        self.store
            .edit_record(RecordQuery::by_id(id), AccountPatch::soft_delete())
            .await?;
        info!(user_id = %id, "Account soft-deleted");
        Ok(())
    }
}

/// Malformed ids cannot name an existing record
fn parse_account_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| AccountError::NotFound)
}

fn validate_new_account(account: &NewAccount) -> Result<()> {
    if !validators::validate_username(&account.username) {
        return Err(AccountError::Validation(
            "username must be 3-32 characters of letters, digits, '-' or '_'".to_string(),
        ));
    }
    if !validators::validate_password(&account.password) {
        return Err(AccountError::Validation(
            "password must be between 1 and 1024 bytes".to_string(),
        ));
    }
    if !validators::validate_email(&account.email) {
        return Err(AccountError::Validation("invalid email address".to_string()));
    }
    if !validators::validate_organisation_id(&account.organisation_id) {
        return Err(AccountError::Validation(
            "organisation id is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_edit(edit: &AccountEdit) -> Result<()> {
    if let Some(username) = &edit.username {
        if !validators::validate_username(username) {
            return Err(AccountError::Validation(
                "username must be 3-32 characters of letters, digits, '-' or '_'".to_string(),
            ));
        }
    }
    if let Some(password) = &edit.password {
        if !validators::validate_password(password) {
            return Err(AccountError::Validation(
                "password must be between 1 and 1024 bytes".to_string(),
            ));
        }
    }
    if let Some(email) = &edit.email {
        if !validators::validate_email(email) {
            return Err(AccountError::Validation("invalid email address".to_string()));
        }
    }
    if let Some(organisation_id) = &edit.organisation_id {
        if !validators::validate_organisation_id(organisation_id) {
            return Err(AccountError::Validation(
                "organisation id is required".to_string(),
            ));
        }
    }
    Ok(())
}
