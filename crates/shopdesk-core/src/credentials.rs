//! Admin credential checks for the session gate.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::validation::ValidationError;
use crate::AppConfig;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern compiles")
});

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Lowercase hex SHA-256 of `salt`, a NUL separator, and `password`.
#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    format!("{:x}", Sha256::digest(format!("{salt}\x00{password}")))
}

/// Shape checks run before any credential comparison.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`] for a malformed address and
/// [`ValidationError::Missing`] for a password shorter than
/// [`MIN_PASSWORD_LEN`].
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail { field: "email" });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::Missing { field: "password" });
    }
    Ok(())
}

/// The single configured admin account.
#[derive(Clone)]
pub struct AdminCredentials {
    email: String,
    salt: String,
    password_sha256: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("salt", &"[redacted]")
            .field("password_sha256", &"[redacted]")
            .finish()
    }
}

impl AdminCredentials {
    #[must_use]
    pub fn new(email: &str, salt: &str, password_sha256: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
            salt: salt.to_owned(),
            password_sha256: password_sha256.to_ascii_lowercase(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.admin_email,
            &config.admin_password_salt,
            &config.admin_password_sha256,
        )
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Email compared case-insensitively, password hash in constant time.
    /// Both comparisons always run.
    #[must_use]
    pub fn verify(&self, email: &str, password: &str) -> bool {
        let email_ok = email.trim().to_lowercase().as_bytes().ct_eq(self.email.as_bytes());
        let candidate = hash_password(&self.salt, password);
        let password_ok = candidate
            .as_bytes()
            .ct_eq(self.password_sha256.as_bytes());
        bool::from(email_ok & password_ok)
    }
}
