//! Credential verification.
//!
//! Verification is an event: the manager builds a [`VerificationEvent`] for
//! the resolved user and hands it to the listeners, in this order:
//!
//! 1. [`UserCheckerListener::pre`] rejects disabled, locked or expired accounts.
//! 2. [`CredentialsVerifier`] decides validity from the authenticator's capability.
//! 3. [`UserCheckerListener::post`] rejects expired credentials.
//! 4. [`PasswordMigrationListener`](crate::listeners::PasswordMigrationListener)
//!    rehashes outdated password hashes.

pub mod credentials;
pub mod user_checker;

use warden_entity::user::User;

use crate::authenticator::Authenticator;
use crate::credentials::Credentials;
use crate::error::{SecurityError, SecurityResult};

pub use credentials::CredentialsVerifier;
pub use user_checker::{DefaultUserChecker, UserChecker, UserCheckerListener};

/// Priority of the pre-authentication user check.
pub const PRE_CHECK_PRIORITY: i32 = -256;
/// Priority of the credential verifier.
pub const VERIFY_PRIORITY: i32 = 0;
/// Priority of the post-authentication user check.
pub const POST_CHECK_PRIORITY: i32 = 256;

/// The verification of one set of credentials against one user.
///
/// Validity can be decided exactly once.
#[derive(Debug)]
pub struct VerificationEvent<'a> {
    authenticator: &'a dyn Authenticator,
    credentials: &'a Credentials,
    user: &'a User,
    firewall: &'a str,
    valid: Option<bool>,
}

impl<'a> VerificationEvent<'a> {
    /// Start an undecided verification.
    pub fn new(
        authenticator: &'a dyn Authenticator,
        credentials: &'a Credentials,
        user: &'a User,
        firewall: &'a str,
    ) -> Self {
        Self {
            authenticator,
            credentials,
            user,
            firewall,
            valid: None,
        }
    }

    /// The authenticator whose credentials are being verified.
    pub fn authenticator(&self) -> &'a dyn Authenticator {
        self.authenticator
    }

    /// The presented credentials.
    pub fn credentials(&self) -> &'a Credentials {
        self.credentials
    }

    /// The resolved user.
    pub fn user(&self) -> &'a User {
        self.user
    }

    /// Firewall name.
    pub fn firewall(&self) -> &'a str {
        self.firewall
    }

    /// Decide validity. Deciding twice is invalid usage.
    pub fn set_valid(&mut self, valid: bool) -> SecurityResult<()> {
        if self.valid.is_some() {
            return Err(SecurityError::invalid_usage(format!(
                "credential validity for \"{}\" has already been decided",
                self.user.identifier
            )));
        }
        self.valid = Some(valid);
        Ok(())
    }

    /// The decision, if one was made.
    pub fn outcome(&self) -> Option<bool> {
        self.valid
    }

    /// Whether the credentials were accepted.
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    /// Whether the credentials were rejected.
    pub fn is_rejected(&self) -> bool {
        self.valid == Some(false)
    }
}
