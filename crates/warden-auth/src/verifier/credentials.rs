//! Decides whether presented credentials are valid for the resolved user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use warden_core::error::AppError;

use super::{VERIFY_PRIORITY, VerificationEvent};
use crate::authenticator::CredentialCheck;
use crate::error::{AuthenticationError, SecurityError, SecurityResult};
use crate::events::AuthListener;
use crate::password::PasswordMatcher;

/// Verification listener dispatching on [`CredentialCheck`].
///
/// - `Password`: an empty presented password fails before the matcher runs;
///   a user without a stored password is accepted.
/// - `Token`: always accepted.
/// - `Custom`: the authenticator's own check decides.
/// - `Undeclared`: misconfiguration.
#[derive(Debug, Clone)]
pub struct CredentialsVerifier {
    matcher: Arc<dyn PasswordMatcher>,
}

impl CredentialsVerifier {
    /// Creates a verifier using `matcher` for password checks.
    pub fn new(matcher: Arc<dyn PasswordMatcher>) -> Self {
        Self { matcher }
    }

    async fn check_password(&self, event: &VerificationEvent<'_>) -> SecurityResult<bool> {
        let presented = event.credentials().presented_password().unwrap_or_default();
        if presented.is_empty() {
            return Err(AuthenticationError::EmptyCredentials.into());
        }

        let user = event.user();
        let Some(stored) = user.password() else {
            debug!(user = %user.identifier, "User has no stored password; accepting");
            return Ok(true);
        };

        // Hashing is CPU-bound; keep it off the async workers.
        let matcher = Arc::clone(&self.matcher);
        let stored = Zeroizing::new(stored.to_string());
        let presented = Zeroizing::new(presented.to_string());
        let salt = user.salt.clone();
        tokio::task::spawn_blocking(move || matcher.matches(&stored, &presented, salt.as_deref()))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }
}

#[async_trait]
impl AuthListener for CredentialsVerifier {
    fn name(&self) -> &str {
        "credentials_verifier"
    }

    fn priority(&self) -> i32 {
        VERIFY_PRIORITY
    }

    async fn on_verify_credentials(&self, event: &mut VerificationEvent<'_>) -> SecurityResult<()> {
        let authenticator = event.authenticator();
        let valid = match authenticator.credential_check() {
            CredentialCheck::Password => self.check_password(event).await?,
            CredentialCheck::Token => true,
            CredentialCheck::Custom => {
                authenticator
                    .check_credentials(event.credentials(), event.user())
                    .await?
            }
            CredentialCheck::Undeclared => {
                return Err(SecurityError::misconfigured(
                    authenticator.key(),
                    "declares no credential check capability",
                ));
            }
        };

        debug!(
            authenticator = %authenticator.key(),
            user = %event.user().identifier,
            valid,
            "Credentials verified"
        );
        event.set_valid(valid)
    }
}
