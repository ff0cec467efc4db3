//! Listener trait for authentication events.

use std::fmt;

use async_trait::async_trait;

use super::{InteractiveLoginEvent, LoginFailureEvent, LoginSuccessEvent, LogoutEvent};
use crate::error::SecurityResult;
use crate::verifier::VerificationEvent;

/// Reacts to authentication events.
///
/// Every handler defaults to a no-op, so listeners implement only the
/// events they care about.
#[async_trait]
pub trait AuthListener: Send + Sync + fmt::Debug {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Ordering; lower runs first, ties keep registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Credentials are being verified. Errors abort the attempt.
    async fn on_verify_credentials(&self, _event: &mut VerificationEvent<'_>) -> SecurityResult<()> {
        Ok(())
    }

    /// A token was installed by an interactive login.
    async fn on_interactive_login(&self, _event: &mut InteractiveLoginEvent<'_>) -> SecurityResult<()> {
        Ok(())
    }

    /// Authentication succeeded.
    async fn on_login_success(&self, _event: &mut LoginSuccessEvent<'_>) -> SecurityResult<()> {
        Ok(())
    }

    /// Authentication failed.
    async fn on_login_failure(&self, _event: &mut LoginFailureEvent<'_>) -> SecurityResult<()> {
        Ok(())
    }

    /// The token was removed.
    async fn on_logout(&self, _event: &mut LogoutEvent<'_>) -> SecurityResult<()> {
        Ok(())
    }
}
