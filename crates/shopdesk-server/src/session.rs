//! Signed, time-bounded admin session tokens (HS256 JWT).

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ISSUER: &str = "shopdesk";
pub const AUDIENCE: &str = "shopdesk-admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

impl Claims {
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// A freshly signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Signs a token for `subject` valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error if signing fails.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(subject, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_owned(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
            iss: ISSUER.to_owned(),
            aud: AUDIENCE.to_owned(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, claims })
    }

    /// Checks signature, issuer, audience and expiry.
    ///
    /// # Errors
    ///
    /// Returns the `jsonwebtoken` error describing the first failed check.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use jsonwebtoken::errors::ErrorKind;

    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_verifies() {
        let keys = SessionKeys::new(SECRET, 3600);
        let issued = keys.issue("admin@example.com").unwrap();
        let claims = keys.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = SessionKeys::new(SECRET, 60);
        let issued = keys
            .issue_at("admin@example.com", Utc::now() - Duration::hours(2))
            .unwrap();
        let err = keys.verify(&issued.token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = SessionKeys::new(b"another-secret-another-secret-xx", 3600)
            .issue("admin@example.com")
            .unwrap();
        let err = SessionKeys::new(SECRET, 3600)
            .verify(&issued.token)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = SessionKeys::new(SECRET, 3600);
        assert!(keys.verify("not.a.jwt").is_err());
    }
}
