//! Remember-me authenticator: logs returning users back in from a cookie.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use warden_entity::token::{Token, TokenKind};
use warden_entity::user::User;

use super::{Authenticator, CredentialCheck, Support};
use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityResult};
use crate::remember_me::{RememberMeService, is_well_formed};
use crate::request::{Request, Response};

/// Authenticates requests carrying a remember-me cookie.
///
/// Support is lazy: a well-formed cookie may still fail to decode, in which
/// case the authenticator fails and the cookie is cleared.
#[derive(Debug, Clone)]
pub struct RememberMeAuthenticator {
    key: String,
    service: Arc<dyn RememberMeService>,
}

impl RememberMeAuthenticator {
    /// Creates the remember-me authenticator for `firewall`.
    pub fn new(firewall: &str, service: Arc<dyn RememberMeService>) -> Self {
        Self {
            key: format!("{firewall}.remember_me"),
            service,
        }
    }

    fn cookie<'r>(&self, request: &'r Request) -> Option<&'r str> {
        request.cookie(self.service.cookie_name())
    }
}

#[async_trait]
impl Authenticator for RememberMeAuthenticator {
    fn key(&self) -> &str {
        &self.key
    }

    fn supports(&self, request: &Request) -> Support {
        if request.token_storage().token().is_some() {
            return Support::NotSupported;
        }
        match self.cookie(request) {
            Some(value) if is_well_formed(value) => Support::SupportedLazily,
            Some(_) => {
                debug!(authenticator = %self.key, "Ignoring malformed remember-me cookie");
                Support::NotSupported
            }
            None => Support::NotSupported,
        }
    }

    fn get_credentials(&self, request: &Request) -> SecurityResult<Option<Credentials>> {
        Ok(self
            .cookie(request)
            .filter(|value| is_well_formed(value))
            .map(|value| Credentials::new().with_segments(value.split('.'))))
    }

    async fn get_user(&self, credentials: &Credentials) -> SecurityResult<Option<User>> {
        self.service.perform_login(credentials).await
    }

    fn credential_check(&self) -> CredentialCheck {
        CredentialCheck::Token
    }

    fn create_authenticated_token(&self, user: User, firewall: &str) -> Token {
        let roles = user.roles.clone();
        Token::new(TokenKind::RememberMe, user, firewall, roles).with_authenticator(&self.key)
    }

    async fn on_authentication_failure(
        &self,
        request: &mut Request,
        error: &AuthenticationError,
    ) -> SecurityResult<Option<Response>> {
        self.service.login_fail(request, error).await;
        Ok(None)
    }
}
