//! Rehashes passwords stored with outdated parameters.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::authenticator::CredentialCheck;
use crate::error::SecurityResult;
use crate::events::AuthListener;
use crate::password::PasswordMatcher;
use crate::user_provider::PasswordUpgrader;
use crate::verifier::VerificationEvent;

/// Priority of the migration listener; after the post-authentication check.
pub const MIGRATION_PRIORITY: i32 = 512;

/// Upgrades the stored hash once a password login has been accepted.
///
/// Upgrade failures are logged and never fail the login.
#[derive(Debug, Clone)]
pub struct PasswordMigrationListener {
    matcher: Arc<dyn PasswordMatcher>,
    upgrader: Arc<dyn PasswordUpgrader>,
}

impl PasswordMigrationListener {
    /// Creates the listener.
    pub fn new(matcher: Arc<dyn PasswordMatcher>, upgrader: Arc<dyn PasswordUpgrader>) -> Self {
        Self { matcher, upgrader }
    }
}

#[async_trait]
impl AuthListener for PasswordMigrationListener {
    fn name(&self) -> &str {
        "password_migration"
    }

    fn priority(&self) -> i32 {
        MIGRATION_PRIORITY
    }

    async fn on_verify_credentials(&self, event: &mut VerificationEvent<'_>) -> SecurityResult<()> {
        if !event.is_valid() || event.authenticator().credential_check() != CredentialCheck::Password {
            return Ok(());
        }

        let user = event.user();
        let Some(stored) = user.password() else {
            return Ok(());
        };
        if !self.matcher.needs_rehash(stored) {
            return Ok(());
        }

        let Some(plain) = event.credentials().presented_password() else {
            return Ok(());
        };
        // Hashing is CPU-bound; keep it off the async workers.
        let matcher = Arc::clone(&self.matcher);
        let plain = Zeroizing::new(plain.to_string());
        let new_hash = match tokio::task::spawn_blocking(move || matcher.hash(&plain)).await {
            Ok(Ok(hash)) => hash,
            Ok(Err(e)) => {
                warn!(user = %user.identifier, error = %e, "Failed to rehash password");
                return Ok(());
            }
            Err(e) => {
                warn!(user = %user.identifier, error = %e, "Password rehash task failed");
                return Ok(());
            }
        };

        match self.upgrader.upgrade_password(user, &new_hash).await {
            Ok(()) => info!(user = %user.identifier, "Password hash migrated"),
            Err(e) => warn!(user = %user.identifier, error = %e, "Failed to store migrated password"),
        }
        Ok(())
    }
}
