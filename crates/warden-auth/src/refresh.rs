//! Re-validation of tokens resumed from a previous request.
//!
//! A token carries the user as it was at login. Before a resumed token is
//! trusted again the user is reloaded and compared with the snapshot; any
//! change that would have prevented the login deauthenticates the token.

use std::sync::Arc;

use tracing::{debug, info};

use warden_entity::token::{Token, TokenKind};
use warden_entity::user::User;

use crate::error::{SecurityError, SecurityResult};
use crate::remember_me::claims::fingerprint;
use crate::user_provider::UserProvider;
use crate::verifier::UserChecker;

/// Token attribute holding the credentials fingerprint taken at login.
pub const FINGERPRINT_ATTRIBUTE: &str = "credentials_fingerprint";

/// Record the fingerprint of the token's user, unless one is already present.
///
/// Must run before credentials are erased from the token.
pub fn stamp_fingerprint(token: &mut Token) {
    if token.kind() == TokenKind::Anonymous || token.attribute(FINGERPRINT_ATTRIBUTE).is_some() {
        return;
    }
    let value = serde_json::Value::String(fingerprint(token.user()));
    token.set_attribute(FINGERPRINT_ATTRIBUTE, value);
}

/// Reloads token users and deauthenticates tokens whose user changed.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    users: Arc<dyn UserProvider>,
    checker: Arc<dyn UserChecker>,
}

impl TokenRefresher {
    /// Creates a refresher over `users`, applying `checker` to reloaded users.
    pub fn new(users: Arc<dyn UserProvider>, checker: Arc<dyn UserChecker>) -> Self {
        Self { users, checker }
    }

    /// Deauthenticate `token` if its user is gone, changed credentials or may no longer log in.
    ///
    /// Anonymous and already deauthenticated tokens are returned untouched.
    pub async fn refresh(&self, mut token: Token) -> SecurityResult<Token> {
        if token.kind() == TokenKind::Anonymous || !token.is_authenticated() {
            return Ok(token);
        }

        let identifier = token.user_identifier().to_string();
        let reason = match self.users.load_user(&identifier).await? {
            None => Some("user no longer exists"),
            Some(user) => self.changed(&token, &user)?,
        };

        match reason {
            Some(reason) => {
                info!(user = %identifier, reason, "Deauthenticating resumed token");
                token.deauthenticate();
            }
            None => debug!(user = %identifier, "Resumed token is still valid"),
        }
        Ok(token)
    }

    fn changed(&self, token: &Token, user: &User) -> SecurityResult<Option<&'static str>> {
        if user.identifier != token.user_identifier() {
            return Ok(Some("identifier changed"));
        }
        let stamped = token
            .attribute(FINGERPRINT_ATTRIBUTE)
            .and_then(serde_json::Value::as_str);
        if stamped.is_some_and(|fpr| fpr != fingerprint(user)) {
            return Ok(Some("credentials changed"));
        }
        for check in [
            self.checker.check_pre_auth(user),
            self.checker.check_post_auth(user),
        ] {
            match check {
                Ok(()) => {}
                Err(SecurityError::Authentication(_)) => return Ok(Some("account can no longer log in")),
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}
