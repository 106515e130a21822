//! Signed double-submit CSRF tokens.
//!
//! DESIGN
//! ======
//! A token is `<nonce>.<issued>.<signature>`: a random 16-byte hex nonce, the
//! issue time in unix seconds and a hex HMAC-SHA256 over the first two parts.
//! The page render sets the token as an HttpOnly cookie and embeds the same
//! value in a `<meta name="csrf-token">` tag; state-changing requests must
//! echo it in the `csrf_token` form field.
//!
//! ERROR HANDLING
//! ==============
//! Every failure maps to 403 at the route layer. Variants exist so logs can
//! say which check failed.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

type HmacSha256 = Hmac<Sha256>;

/// Cookie carrying the token.
pub const CSRF_COOKIE_NAME: &str = "csrf_token";

/// Tokens older than this are rejected.
pub const MAX_AGE: Duration = Duration::hours(2);

/// Allowed clock skew for tokens issued "in the future".
const MAX_FUTURE_SKEW_SECS: i64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("csrf secret is empty")]
    InvalidKey,
    #[error("csrf token missing")]
    Missing,
    #[error("csrf cookie and form token differ")]
    Mismatch,
    #[error("csrf token malformed")]
    Malformed,
    #[error("csrf token signature invalid")]
    BadSignature,
    #[error("csrf token expired")]
    Expired,
}

/// Issues and validates tokens under one secret.
#[derive(Clone)]
pub struct CsrfSigner {
    mac: HmacSha256,
}

impl CsrfSigner {
    /// # Errors
    ///
    /// Returns [`CsrfError::InvalidKey`] for an empty secret.
    pub fn new(secret: &str) -> Result<Self, CsrfError> {
        if secret.is_empty() {
            return Err(CsrfError::InvalidKey);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| CsrfError::InvalidKey)?;
        Ok(Self { mac })
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[must_use]
    pub fn issue(&self) -> String {
        self.issue_at(OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn issue_at(&self, now: OffsetDateTime) -> String {
        let nonce: [u8; 16] = rand::rng().random();
        let payload = format!("{}.{}", hex::encode(nonce), now.unix_timestamp());
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    /// Check signature and age of a single token.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate_at(&self, token: &str, now: OffsetDateTime) -> Result<(), CsrfError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(CsrfError::Malformed)?;
        let (nonce, issued) = payload.split_once('.').ok_or(CsrfError::Malformed)?;
        if nonce.is_empty() || hex::decode(nonce).is_err() {
            return Err(CsrfError::Malformed);
        }
        let issued: i64 = issued.parse().map_err(|_| CsrfError::Malformed)?;
        let expected = hex::decode(signature).map_err(|_| CsrfError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&expected).map_err(|_| CsrfError::BadSignature)?;

        let age = now.unix_timestamp() - issued;
        if age > MAX_AGE.whole_seconds() || age < -MAX_FUTURE_SKEW_SECS {
            return Err(CsrfError::Expired);
        }
        Ok(())
    }

    /// Whether `token` can be reused for another page render.
    #[must_use]
    pub fn is_fresh(&self, token: &str, now: OffsetDateTime) -> bool {
        self.validate_at(token, now).is_ok()
    }

    /// Double-submit check: the cookie and form values must be the same
    /// valid token.
    ///
    /// # Errors
    ///
    /// Returns [`CsrfError::Missing`] when either side is absent,
    /// [`CsrfError::Mismatch`] when they differ, or the validation failure.
    pub fn verify_pair(&self, cookie: Option<&str>, submitted: &str, now: OffsetDateTime) -> Result<(), CsrfError> {
        let cookie = cookie.filter(|c| !c.is_empty()).ok_or(CsrfError::Missing)?;
        if submitted.is_empty() {
            return Err(CsrfError::Missing);
        }
        if cookie != submitted {
            return Err(CsrfError::Mismatch);
        }
        self.validate_at(submitted, now)
    }
}

#[cfg(test)]
#[path = "csrf_test.rs"]
mod tests;
