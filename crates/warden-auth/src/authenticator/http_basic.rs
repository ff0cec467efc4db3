//! HTTP Basic authentication.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::header;

use warden_entity::user::User;

use super::{Authenticator, CredentialCheck, Support};
use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityResult};
use crate::request::{Request, Response, unauthorized_response};
use crate::user_provider::UserProvider;

const SCHEME: &str = "Basic ";

/// Authenticates `Authorization: Basic` requests against a user provider.
#[derive(Debug, Clone)]
pub struct HttpBasicAuthenticator {
    key: String,
    realm: String,
    users: Arc<dyn UserProvider>,
}

impl HttpBasicAuthenticator {
    /// Creates the basic authenticator for `firewall`.
    pub fn new(firewall: &str, realm: impl Into<String>, users: Arc<dyn UserProvider>) -> Self {
        Self {
            key: format!("{firewall}.http_basic"),
            realm: realm.into(),
            users,
        }
    }

    /// The challenge sent with 401 responses.
    pub fn challenge(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }
}

/// Decode the `user:password` pair of a Basic authorization header.
fn decode_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix(SCHEME)?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl Authenticator for HttpBasicAuthenticator {
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
        let (username, password) = decode_basic(value).ok_or_else(|| {
            AuthenticationError::Custom("Malformed Basic authorization header.".to_string())
        })?;
        Ok(Some(Credentials::password(username, password)))
    }

    async fn get_user(&self, credentials: &Credentials) -> SecurityResult<Option<User>> {
        match credentials.identifier() {
            Some(identifier) => self.users.load_user(identifier).await,
            None => Ok(None),
        }
    }

    fn credential_check(&self) -> CredentialCheck {
        CredentialCheck::Password
    }

    async fn on_authentication_failure(
        &self,
        _request: &mut Request,
        error: &AuthenticationError,
    ) -> SecurityResult<Option<Response>> {
        Ok(Some(unauthorized_response(&self.challenge(), error.message_key())))
    }
}
