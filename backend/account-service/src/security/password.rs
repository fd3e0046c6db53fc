/// Password hashing and verification using Argon2id
use crate::error::{AccountError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Salted one-way credential hasher
///
/// Hashing is CPU-bound; the async entry points move the work onto the
/// blocking pool so request handlers never stall the runtime.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Hash of a throwaway secret, verified against when the account does not
    /// exist so unknown usernames cost the same as wrong passwords
    dummy_hash: String,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    pub fn new(cost: HashingCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AccountError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"account-service-dummy-credential", &salt)
            .map_err(|e| AccountError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password into a PHC string with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AccountError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against its stored hash
    ///
    /// Uses the parameters embedded in the PHC string, so hashes produced under
    /// an older cost keep verifying.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| AccountError::Internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AccountError::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    pub async fn hash(&self, password: String) -> Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AccountError::Internal(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify(&self, password: String, password_hash: String) -> Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &password_hash))
            .await
            .map_err(|e| AccountError::Internal(format!("Verification task failed: {}", e)))?
    }

    /// Spend one verification's worth of work against the dummy hash
    pub async fn burn_verification(&self, password: String) {
        let dummy = self.dummy_hash.clone();
        let _ = self.verify(password, dummy).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash_password("secret123").unwrap();

        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("secret123", &hash).unwrap());
        assert!(!hasher.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_distinct_hashes() {
        let hasher = fast_hasher();
        let first = hasher.hash_password("secret123").unwrap();
        let second = hasher.hash_password("secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = fast_hasher();
        assert!(hasher.verify_password("secret123", "not-a-hash").is_err());
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = CredentialHasher::new(HashingCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_with_hash_from_other_cost() {
        let old = fast_hasher();
        let hash = old.hash_password("secret123").unwrap();

        let current = CredentialHasher::new(HashingCost {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(current.verify_password("secret123", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_async_roundtrip() {
        let hasher = fast_hasher();
        let hash = hasher.hash("secret123".to_string()).await.unwrap();
        assert!(hasher.verify("secret123".to_string(), hash).await.unwrap());
    }
}
