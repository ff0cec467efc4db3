//! Account status checks around credential verification.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use warden_entity::user::{User, UserStatus};

use super::{POST_CHECK_PRIORITY, PRE_CHECK_PRIORITY, VerificationEvent};
use crate::error::{AuthenticationError, SecurityResult};
use crate::events::AuthListener;

/// Checks account state before and after credentials are verified.
pub trait UserChecker: Send + Sync + fmt::Debug {
    /// Runs before verification; rejects accounts that cannot log in at all.
    fn check_pre_auth(&self, user: &User) -> SecurityResult<()>;

    /// Runs after successful verification.
    fn check_post_auth(&self, user: &User) -> SecurityResult<()>;
}

/// Status, lock and expiry checks on [`User`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUserChecker;

impl UserChecker for DefaultUserChecker {
    fn check_pre_auth(&self, user: &User) -> SecurityResult<()> {
        match user.status {
            UserStatus::Inactive => return Err(AuthenticationError::AccountDisabled.into()),
            UserStatus::Locked => {
                return Err(AuthenticationError::AccountLocked {
                    until: user.locked_until,
                }
                .into());
            }
            UserStatus::Active => {}
        }

        if user.is_locked() {
            return Err(AuthenticationError::AccountLocked {
                until: user.locked_until,
            }
            .into());
        }

        if user.is_expired() {
            return Err(AuthenticationError::AccountExpired.into());
        }

        Ok(())
    }

    fn check_post_auth(&self, user: &User) -> SecurityResult<()> {
        if user.credentials_expired() {
            return Err(AuthenticationError::CredentialsExpired.into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pre,
    Post,
}

/// Runs a [`UserChecker`] as a verification listener.
#[derive(Debug)]
pub struct UserCheckerListener {
    checker: Arc<dyn UserChecker>,
    phase: Phase,
}

impl UserCheckerListener {
    /// The pre-verification check.
    pub fn pre(checker: Arc<dyn UserChecker>) -> Self {
        Self {
            checker,
            phase: Phase::Pre,
        }
    }

    /// The post-verification check; only runs for accepted credentials.
    pub fn post(checker: Arc<dyn UserChecker>) -> Self {
        Self {
            checker,
            phase: Phase::Post,
        }
    }
}

#[async_trait]
impl AuthListener for UserCheckerListener {
    fn name(&self) -> &str {
        match self.phase {
            Phase::Pre => "user_checker.pre",
            Phase::Post => "user_checker.post",
        }
    }

    fn priority(&self) -> i32 {
        match self.phase {
            Phase::Pre => PRE_CHECK_PRIORITY,
            Phase::Post => POST_CHECK_PRIORITY,
        }
    }

    async fn on_verify_credentials(&self, event: &mut VerificationEvent<'_>) -> SecurityResult<()> {
        match self.phase {
            Phase::Pre => self.checker.check_pre_auth(event.user()),
            Phase::Post if event.is_valid() => self.checker.check_post_auth(event.user()),
            Phase::Post => Ok(()),
        }
    }
}
