/// Session token issuance for the credential gateway
///
/// Tokens are HS256-signed JWTs carrying the verified account's profile fields.
///
/// ## Security Design
///
/// - **Injected secret**: the signing secret is a constructor argument; nothing
///   is read from the environment here
/// - **Absolute expiry**: `exp = iat + lifetime`, both Unix seconds, computed at
///   issuance and never extended afterwards
/// - **Issuer pinned**: validation rejects tokens from any other issuer
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::{SessionSubject, TokenIssuer};
/// use std::time::Duration;
///
/// let issuer = TokenIssuer::new(b"change-me", "auth-gateway", Duration::from_secs(3600))
///     .expect("valid issuer configuration");
/// let subject = SessionSubject {
///     username: "alice".into(),
///     display_name: "Alice A".into(),
///     email: "a@x.com".into(),
///     organisation_id: "org1".into(),
///     description: "bio".into(),
/// };
/// let token = issuer.issue(&subject).expect("signing succeeds");
/// assert_eq!(issuer.validate(&token).unwrap().sub, "alice");
/// ```
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Symmetric signing algorithm used for session tokens
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing secret must not be empty")]
    EmptySecret,
    #[error("token lifetime must be positive")]
    InvalidLifetime,
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Verified identity the token is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub organisation_id: String,
    pub description: String,
}

/// JWT claims: registered claims plus profile fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,
    /// Display name
    pub name: String,
    pub email: String,
    pub organisation_id: String,
    pub description: String,
    /// Issuer identifier
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Absolute expiration time (Unix timestamp)
    pub exp: i64,
}

/// Builds and signs bounded-lifetime session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    lifetime: chrono::Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, lifetime: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let lifetime = chrono::Duration::from_std(lifetime).map_err(|_| TokenError::InvalidLifetime)?;
        if lifetime <= chrono::Duration::zero() {
            return Err(TokenError::InvalidLifetime);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            lifetime,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Token lifetime in whole seconds
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Build the claims for `subject` as of `now`
    pub fn claims_at(&self, subject: &SessionSubject, now: DateTime<Utc>) -> SessionClaims {
        let expiry = now + self.lifetime;
        SessionClaims {
            sub: subject.username.clone(),
            name: subject.display_name.clone(),
            email: subject.email.clone(),
            organisation_id: subject.organisation_id.clone(),
            description: subject.description.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        }
    }

    /// Issue a token valid from now until now + lifetime
    pub fn issue(&self, subject: &SessionSubject) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &SessionSubject, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.claims_at(subject, now);
        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, issuer and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-unit-tests";

    fn subject() -> SessionSubject {
        SessionSubject {
            username: "alice".to_string(),
            display_name: "Alice A".to_string(),
            email: "a@x.com".to_string(),
            organisation_id: "org1".to_string(),
            description: "bio".to_string(),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TEST_SECRET, "test-issuer", Duration::from_secs(3600)).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();
        let token = issuer.issue(&subject()).unwrap();
        assert_eq!(token.matches('.').count(), 2); // JWT has 3 parts

        let claims = issuer.validate(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.name, "Alice A");
        assert_eq!(claims.organisation_id, "org1");
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_expiry_is_absolute() {
        let issuer = issuer();
        let now = Utc::now();
        let claims = issuer.claims_at(&subject(), now);

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 3600);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        let token = issuer.issue_at(&subject(), two_hours_ago).unwrap();

        assert!(matches!(issuer.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issuer().issue(&subject()).unwrap();
        let other = TokenIssuer::new(b"another-secret", "test-issuer", Duration::from_secs(3600)).unwrap();

        assert!(matches!(other.validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let token = issuer().issue(&subject()).unwrap();
        let other = TokenIssuer::new(TEST_SECRET, "someone-else", Duration::from_secs(3600)).unwrap();

        assert!(matches!(other.validate(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            TokenIssuer::new(b"", "iss", Duration::from_secs(60)),
            Err(TokenError::EmptySecret)
        ));
        assert!(matches!(
            TokenIssuer::new(TEST_SECRET, "iss", Duration::ZERO),
            Err(TokenError::InvalidLifetime)
        ));
    }
}
