//! User entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::status::UserStatus;

/// Identifier carried by the user behind anonymous tokens.
pub const ANONYMOUS_IDENTIFIER: &str = "anon.";

/// A user resolved by an authenticator.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique login identifier.
    pub identifier: String,
    /// Stored password hash. Never serialized.
    #[serde(skip)]
    password: Option<Zeroizing<String>>,
    /// Legacy salt for matchers that keep it outside the hash.
    #[serde(skip)]
    pub salt: Option<String>,
    /// Granted roles.
    pub roles: Vec<String>,
    /// Account status.
    pub status: UserStatus,
    /// Account locked until this time (if locked).
    pub locked_until: Option<DateTime<Utc>>,
    /// The account itself stops being usable after this time.
    pub expires_at: Option<DateTime<Utc>>,
    /// The stored password stops being accepted after this time.
    pub credentials_expire_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create an active user with no password and no roles.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: None,
            salt: None,
            roles: Vec::new(),
            status: UserStatus::Active,
            locked_until: None,
            expires_at: None,
            credentials_expire_at: None,
        }
    }

    /// The user behind anonymous tokens.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_IDENTIFIER)
    }

    /// Attach a stored password hash.
    pub fn with_password(mut self, hash: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(hash.into()));
        self
    }

    /// Replace the granted roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the account status.
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    /// The stored password hash, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().map(String::as_str)
    }

    /// Replace the stored password hash.
    pub fn set_password(&mut self, hash: impl Into<String>) {
        self.password = Some(Zeroizing::new(hash.into()));
    }

    /// Wipe the stored secret.
    pub fn erase_credentials(&mut self) {
        self.password = None;
        self.salt = None;
    }

    /// Whether this is the anonymous user.
    pub fn is_anonymous(&self) -> bool {
        self.identifier == ANONYMOUS_IDENTIFIER
    }

    /// Check if the user account is currently locked.
    pub fn is_locked(&self) -> bool {
        if self.status == UserStatus::Locked {
            return true;
        }
        if let Some(locked_until) = self.locked_until {
            return Utc::now() < locked_until;
        }
        false
    }

    /// Check if the account has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }

    /// Check if the stored credentials have expired.
    pub fn credentials_expired(&self) -> bool {
        self.credentials_expire_at.is_some_and(|at| at <= Utc::now())
    }

    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login() && !self.is_locked() && !self.is_expired()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("roles", &self.roles)
            .field("status", &self.status)
            .field("locked_until", &self.locked_until)
            .field("expires_at", &self.expires_at)
            .field("credentials_expire_at", &self.credentials_expire_at)
            .finish()
    }
}
