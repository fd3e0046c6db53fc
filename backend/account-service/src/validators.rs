use once_cell::sync::Lazy;
use regex::Regex;

/// Input validation utilities for account-service

// These patterns are hardcoded and always valid, so expect() cannot fire at runtime
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{3,32}$")
        .expect("hardcoded username regex is invalid - fix source code")
});

/// Upper bound on accepted password length, in bytes
pub const MAX_PASSWORD_BYTES: usize = 1024;

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate username format (3-32 characters, alphanumeric with - and _)
pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// Passwords only need to be present and bounded
pub fn validate_password(password: &str) -> bool {
    !password.is_empty() && password.len() <= MAX_PASSWORD_BYTES
}

pub fn validate_organisation_id(organisation_id: &str) -> bool {
    !organisation_id.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com"));
        assert!(validate_email("first.last+tag@example.co.uk"));
        assert!(!validate_email(""));
        assert!(!validate_email("no-at-sign"));
        assert!(!validate_email("a@x"));
        assert!(!validate_email(&format!("{}@x.com", "a".repeat(260))));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice"));
        assert!(validate_username("bob_the-builder"));
        assert!(!validate_username("ab"));
        assert!(!validate_username("has space"));
        assert!(!validate_username(&"a".repeat(33)));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret123"));
        assert!(!validate_password(""));
        assert!(!validate_password(&"p".repeat(MAX_PASSWORD_BYTES + 1)));
    }

    #[test]
    fn test_validate_organisation_id() {
        assert!(validate_organisation_id("org1"));
        assert!(!validate_organisation_id(""));
        assert!(!validate_organisation_id("   "));
    }
}
