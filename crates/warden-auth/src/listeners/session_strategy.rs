//! Session fixation protection on login.

use async_trait::async_trait;

use warden_core::config::SessionFixationStrategy;
use warden_entity::token::TokenKind;

use crate::error::SecurityResult;
use crate::events::{AuthListener, LoginSuccessEvent};
use crate::session::SessionAuthenticationStrategy;

/// Regenerates the session after every successful login on stateful firewalls.
#[derive(Debug, Clone, Copy)]
pub struct SessionStrategyListener {
    strategy: SessionAuthenticationStrategy,
    stateless: bool,
}

impl SessionStrategyListener {
    /// Creates the listener.
    pub fn new(strategy: SessionFixationStrategy, stateless: bool) -> Self {
        Self {
            strategy: SessionAuthenticationStrategy::new(strategy),
            stateless,
        }
    }
}

#[async_trait]
impl AuthListener for SessionStrategyListener {
    fn name(&self) -> &str {
        "session_strategy"
    }

    async fn on_login_success(&self, event: &mut LoginSuccessEvent<'_>) -> SecurityResult<()> {
        // Anonymous fallbacks run on every request and must not rotate the session.
        if self.stateless || event.token.kind() == TokenKind::Anonymous {
            return Ok(());
        }
        if let Some(session) = event.request.session_mut() {
            self.strategy.on_authentication(session);
        }
        Ok(())
    }
}
