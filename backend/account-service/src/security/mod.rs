/// Security primitives for account-service
///
/// - **password**: Argon2id credential hashing and verification
pub mod password;

pub use password::{CredentialHasher, HashingCost};
