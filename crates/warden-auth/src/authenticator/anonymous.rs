//! Anonymous authenticator: the fallback for requests without credentials.

use async_trait::async_trait;

use warden_entity::token::{Token, TokenKind};
use warden_entity::user::User;

use super::{Authenticator, CredentialCheck, Support};
use crate::credentials::Credentials;
use crate::error::SecurityResult;
use crate::request::Request;

/// Issues an anonymous token when nothing else authenticated the request.
#[derive(Debug, Clone)]
pub struct AnonymousAuthenticator {
    key: String,
}

impl AnonymousAuthenticator {
    /// Creates the anonymous authenticator for `firewall`.
    pub fn new(firewall: &str) -> Self {
        Self {
            key: format!("{firewall}.anonymous"),
        }
    }
}

#[async_trait]
impl Authenticator for AnonymousAuthenticator {
    fn key(&self) -> &str {
        &self.key
    }

    fn supports(&self, request: &Request) -> Support {
        if request.token_storage().token().is_some() {
            Support::NotSupported
        } else {
            Support::Supported
        }
    }

    fn get_credentials(&self, _request: &Request) -> SecurityResult<Option<Credentials>> {
        Ok(Some(Credentials::new()))
    }

    async fn get_user(&self, _credentials: &Credentials) -> SecurityResult<Option<User>> {
        Ok(Some(User::anonymous()))
    }

    fn credential_check(&self) -> CredentialCheck {
        CredentialCheck::Token
    }

    fn create_authenticated_token(&self, user: User, firewall: &str) -> Token {
        Token::new(TokenKind::Anonymous, user, firewall, Vec::new()).with_authenticator(&self.key)
    }
}
