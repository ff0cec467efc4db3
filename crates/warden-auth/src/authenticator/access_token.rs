//! Bearer access token authentication.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::header;

use warden_entity::user::User;

use super::{Authenticator, CredentialCheck, Support};
use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityResult};
use crate::request::{Request, Response, unauthorized_response};
use crate::user_provider::UserProvider;

const SCHEME: &str = "Bearer ";
const TOKEN_VALUE: &str = "access_token";

/// Maps an access token to the identifier of the user it was issued to.
#[async_trait]
pub trait AccessTokenHandler: Send + Sync + fmt::Debug {
    /// The user identifier for `token`, or `None` if the token is not valid.
    async fn user_identifier_for(&self, token: &str) -> SecurityResult<Option<String>>;
}

/// Fixed token table, typically from configuration.
#[derive(Clone, Default)]
pub struct StaticAccessTokenHandler {
    tokens: HashMap<String, String>,
}

impl StaticAccessTokenHandler {
    /// Creates a handler from token to identifier pairs.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl fmt::Debug for StaticAccessTokenHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAccessTokenHandler")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

#[async_trait]
impl AccessTokenHandler for StaticAccessTokenHandler {
    async fn user_identifier_for(&self, token: &str) -> SecurityResult<Option<String>> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// Authenticates `Authorization: Bearer` requests.
///
/// The token is validated while resolving the user, so verification treats
/// possession as proof.
#[derive(Debug, Clone)]
pub struct AccessTokenAuthenticator {
    key: String,
    handler: Arc<dyn AccessTokenHandler>,
    users: Arc<dyn UserProvider>,
}

impl AccessTokenAuthenticator {
    /// Creates the access token authenticator for `firewall`.
    pub fn new(
        firewall: &str,
        handler: Arc<dyn AccessTokenHandler>,
        users: Arc<dyn UserProvider>,
    ) -> Self {
        Self {
            key: format!("{firewall}.access_token"),
            handler,
            users,
        }
    }
}

#[async_trait]
impl Authenticator for AccessTokenAuthenticator {
    fn key(&self) -> &str {
        &self.key
    }

    fn supports(&self, request: &Request) -> Support {
        match request.header(&header::AUTHORIZATION) {
            Some(value) if value.starts_with(SCHEME) => Support::Supported,
            _ => Support::NotSupported,
        }
    }

    fn get_credentials(&self, request: &Request) -> SecurityResult<Option<Credentials>> {
        let Some(value) = request.header(&header::AUTHORIZATION) else {
            return Ok(None);
        };
        let token = value.strip_prefix(SCHEME).unwrap_or_default().trim();
        if token.is_empty() {
            return Err(AuthenticationError::BadCredentials.into());
        }
        Ok(Some(Credentials::new().with_value(TOKEN_VALUE, token)))
    }

    async fn get_user(&self, credentials: &Credentials) -> SecurityResult<Option<User>> {
        let token = credentials.value(TOKEN_VALUE).unwrap_or_default();
        let Some(identifier) = self.handler.user_identifier_for(token).await? else {
            return Err(AuthenticationError::BadCredentials.into());
        };
        self.users.load_user(&identifier).await
    }

    fn credential_check(&self) -> CredentialCheck {
        CredentialCheck::Token
    }

    async fn on_authentication_failure(
        &self,
        _request: &mut Request,
        error: &AuthenticationError,
    ) -> SecurityResult<Option<Response>> {
        Ok(Some(unauthorized_response(
            "Bearer error=\"invalid_token\"",
            error.message_key(),
        )))
    }
}
