//! Structured audit log lines for logins and logouts.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::SecurityResult;
use crate::events::{AuthListener, LoginFailureEvent, LoginSuccessEvent, LogoutEvent};

/// Writes one log line per login, failed login and logout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginAuditListener;

#[async_trait]
impl AuthListener for LoginAuditListener {
    fn name(&self) -> &str {
        "audit"
    }

    fn priority(&self) -> i32 {
        1024
    }

    async fn on_login_success(&self, event: &mut LoginSuccessEvent<'_>) -> SecurityResult<()> {
        info!(
            target: "warden::audit",
            firewall = %event.firewall,
            authenticator = %event.authenticator.key(),
            user = %event.token.user_identifier(),
            kind = %event.token.kind(),
            path = %event.request.path(),
            "Login succeeded"
        );
        Ok(())
    }

    async fn on_login_failure(&self, event: &mut LoginFailureEvent<'_>) -> SecurityResult<()> {
        warn!(
            target: "warden::audit",
            firewall = %event.firewall,
            authenticator = %event.authenticator.key(),
            error = %event.error,
            path = %event.request.path(),
            "Login failed"
        );
        Ok(())
    }

    async fn on_logout(&self, event: &mut LogoutEvent<'_>) -> SecurityResult<()> {
        info!(
            target: "warden::audit",
            firewall = %event.firewall,
            user = ?event.token.map(|t| t.user_identifier()),
            "Logged out"
        );
        Ok(())
    }
}
