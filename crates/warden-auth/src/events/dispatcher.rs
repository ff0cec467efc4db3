//! Event dispatcher: delivers authentication events to listeners in priority order.
//!
//! Verification is the only event whose listeners decide anything:
//! - Listener errors abort the attempt and propagate.
//! - Delivery stops as soon as a listener marks the credentials invalid.
//!
//! Notification events (interactive login, success, failure, logout):
//! - Every listener runs.
//! - Listener errors are logged and swallowed.

use std::sync::Arc;

use tracing::{debug, warn};

use super::listener::AuthListener;
use super::{InteractiveLoginEvent, LoginFailureEvent, LoginSuccessEvent, LogoutEvent};
use crate::error::SecurityResult;
use crate::verifier::VerificationEvent;

/// Ordered set of listeners, immutable once the firewall is built.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    listeners: Vec<Arc<dyn AuthListener>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener, keeping the list sorted by priority.
    pub fn register(&mut self, listener: Arc<dyn AuthListener>) {
        debug!(
            listener = %listener.name(),
            priority = listener.priority(),
            "Registered authentication listener"
        );
        self.listeners.push(listener);
        self.listeners.sort_by_key(|l| l.priority());
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_listener(mut self, listener: Arc<dyn AuthListener>) -> Self {
        self.register(listener);
        self
    }

    /// Registered listeners in delivery order.
    pub fn listeners(&self) -> &[Arc<dyn AuthListener>] {
        &self.listeners
    }

    /// Runs verification listeners until one rejects the credentials.
    pub async fn verify_credentials(&self, event: &mut VerificationEvent<'_>) -> SecurityResult<()> {
        for listener in &self.listeners {
            listener.on_verify_credentials(event).await?;
            if event.is_rejected() {
                debug!(
                    listener = %listener.name(),
                    user = %event.user().identifier,
                    "Credentials rejected, stopping verification"
                );
                break;
            }
        }
        Ok(())
    }

    /// Delivers an interactive-login notification.
    pub async fn interactive_login(&self, event: &mut InteractiveLoginEvent<'_>) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_interactive_login(event).await {
                warn!(listener = %listener.name(), error = %e, "Interactive login listener failed");
            }
        }
    }

    /// Delivers a login-success notification.
    pub async fn login_success(&self, event: &mut LoginSuccessEvent<'_>) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_login_success(event).await {
                warn!(listener = %listener.name(), error = %e, "Login success listener failed");
            }
        }
    }

    /// Delivers a login-failure notification.
    pub async fn login_failure(&self, event: &mut LoginFailureEvent<'_>) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_login_failure(event).await {
                warn!(listener = %listener.name(), error = %e, "Login failure listener failed");
            }
        }
    }

    /// Delivers a logout notification.
    pub async fn logout(&self, event: &mut LogoutEvent<'_>) {
        for listener in &self.listeners {
            if let Err(e) = listener.on_logout(event).await {
                warn!(listener = %listener.name(), error = %e, "Logout listener failed");
            }
        }
    }
}
