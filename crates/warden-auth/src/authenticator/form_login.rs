//! Form login: a POSTed username and password.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use warden_core::config::FormLoginConfig;
use warden_entity::token::Token;
use warden_entity::user::User;

use super::{Authenticator, CredentialCheck, Support};
use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityResult};
use crate::request::{Request, Response, redirect_response};
use crate::user_provider::UserProvider;

/// Session key holding the message of the last failed login.
pub const LAST_ERROR_KEY: &str = "_security.last_error";
/// Session key holding the identifier of the last login attempt.
pub const LAST_USERNAME_KEY: &str = "_security.last_username";
/// Request parameter that overrides the post-login target.
const TARGET_PATH_PARAMETER: &str = "_target_path";
/// Longest identifier accepted from the form.
const MAX_USERNAME_LENGTH: usize = 4096;

/// Authenticates POSTs to the configured check path.
#[derive(Debug, Clone)]
pub struct FormLoginAuthenticator {
    key: String,
    options: FormLoginConfig,
    users: Arc<dyn UserProvider>,
}

impl FormLoginAuthenticator {
    /// Creates the form login authenticator for `firewall`.
    pub fn new(firewall: &str, options: FormLoginConfig, users: Arc<dyn UserProvider>) -> Self {
        Self {
            key: format!("{firewall}.form_login"),
            options,
            users,
        }
    }

    fn target_path<'r>(&'r self, request: &'r Request) -> &'r str {
        request
            .parameter(TARGET_PATH_PARAMETER)
            .filter(|path| path.starts_with('/') && !path.starts_with("//"))
            .unwrap_or(self.options.default_target_path.as_str())
    }
}

#[async_trait]
impl Authenticator for FormLoginAuthenticator {
    fn key(&self) -> &str {
        &self.key
    }

    fn supports(&self, request: &Request) -> Support {
        if request.method() == Method::POST && request.path() == self.options.check_path {
            Support::Supported
        } else {
            Support::NotSupported
        }
    }

    fn get_credentials(&self, request: &Request) -> SecurityResult<Option<Credentials>> {
        let username = request
            .parameter(&self.options.username_parameter)
            .map(str::trim)
            .unwrap_or_default();
        if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
            return Err(AuthenticationError::BadCredentials.into());
        }
        let password = request
            .parameter(&self.options.password_parameter)
            .unwrap_or_default();

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

    async fn on_authentication_success(
        &self,
        request: &mut Request,
        _token: &Token,
        _firewall: &str,
    ) -> SecurityResult<Option<Response>> {
        let target = self.target_path(request).to_string();
        if let Some(session) = request.session_mut() {
            session.remove(LAST_ERROR_KEY);
        }
        Ok(Some(redirect_response(&target)))
    }

    async fn on_authentication_failure(
        &self,
        request: &mut Request,
        error: &AuthenticationError,
    ) -> SecurityResult<Option<Response>> {
        let username = request
            .parameter(&self.options.username_parameter)
            .map(str::to_string);
        if let Some(session) = request.session_mut() {
            session.insert(LAST_ERROR_KEY, serde_json::json!(error.message_key()));
            if let Some(username) = username {
                session.insert(LAST_USERNAME_KEY, serde_json::json!(username));
            }
        }
        Ok(Some(redirect_response(&self.options.login_path)))
    }

    fn supports_remember_me(&self) -> bool {
        true
    }
}
