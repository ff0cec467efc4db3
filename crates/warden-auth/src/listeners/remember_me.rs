//! Issues remember-me cookies after logins that ask for one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use warden_core::config::RememberMeConfig;

use crate::error::SecurityResult;
use crate::events::{AuthListener, LoginSuccessEvent, LogoutEvent};
use crate::remember_me::RememberMeService;

/// Request parameter values that opt into remember-me.
const TRUTHY: [&str; 4] = ["true", "on", "1", "yes"];

/// Bridges login events to a [`RememberMeService`].
#[derive(Debug, Clone)]
pub struct RememberMeListener {
    service: Arc<dyn RememberMeService>,
    always_remember_me: bool,
    parameter: String,
}

impl RememberMeListener {
    /// Creates the listener from remember-me configuration.
    pub fn new(service: Arc<dyn RememberMeService>, config: &RememberMeConfig) -> Self {
        Self {
            service,
            always_remember_me: config.always_remember_me,
            parameter: config.remember_me_parameter.clone(),
        }
    }
}

#[async_trait]
impl AuthListener for RememberMeListener {
    fn name(&self) -> &str {
        "remember_me"
    }

    async fn on_login_success(&self, event: &mut LoginSuccessEvent<'_>) -> SecurityResult<()> {
        if !event.authenticator.supports_remember_me() {
            return Ok(());
        }

        let requested = event
            .request
            .parameter(&self.parameter)
            .is_some_and(|v| TRUTHY.contains(&v.to_ascii_lowercase().as_str()));
        if !self.always_remember_me && !requested {
            debug!(
                authenticator = %event.authenticator.key(),
                "Remember-me not requested"
            );
            return Ok(());
        }

        self.service
            .login_success(event.request, event.response.as_mut(), event.token)
            .await
    }

    async fn on_logout(&self, event: &mut LogoutEvent<'_>) -> SecurityResult<()> {
        self.service
            .logout(event.request, event.response.as_mut())
            .await;
        Ok(())
    }
}
