//! Remember-me cookie payload.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use warden_entity::user::User;

/// Claims signed into a remember-me cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberMeClaims {
    /// User identifier.
    pub sub: String,
    /// Issued at (UNIX timestamp).
    pub iat: i64,
    /// Expiration (UNIX timestamp).
    pub exp: i64,
    /// Fingerprint of the user's stored credentials at issue time.
    pub fpr: String,
}

impl RememberMeClaims {
    /// Build claims for `user`, valid for `lifetime_seconds` from `now`.
    pub fn new(user: &User, now: i64, lifetime_seconds: u64) -> Self {
        let lifetime = i64::try_from(lifetime_seconds).unwrap_or(i64::MAX);
        Self {
            sub: user.identifier.clone(),
            iat: now,
            exp: now.saturating_add(lifetime),
            fpr: fingerprint(user),
        }
    }

    /// Whether the claims still match the user's current credentials.
    pub fn matches(&self, user: &User) -> bool {
        self.sub == user.identifier && self.fpr == fingerprint(user)
    }
}

/// SHA-256 over the identifier and stored hash; changes whenever the password does.
pub fn fingerprint(user: &User) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user.identifier.as_bytes());
    hasher.update([0u8]);
    hasher.update(user.password().unwrap_or_default().as_bytes());
    format!("{:x}", hasher.finalize())
}
