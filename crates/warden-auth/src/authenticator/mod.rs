//! The authenticator contract and the shipped authenticators.
//!
//! An authenticator knows how to recognise its kind of request, pull
//! credentials out of it and resolve the user they claim. Credential
//! verification itself is done by listeners on the verification event,
//! driven by the capability the authenticator declares through
//! [`Authenticator::credential_check`].

pub mod access_token;
pub mod anonymous;
pub mod form_login;
pub mod http_basic;
pub mod remember_me;

use std::fmt;

use async_trait::async_trait;

use warden_entity::token::{Token, TokenKind};
use warden_entity::user::User;

use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityError, SecurityResult};
use crate::request::{Request, Response};

pub use access_token::{AccessTokenAuthenticator, AccessTokenHandler, StaticAccessTokenHandler};
pub use anonymous::AnonymousAuthenticator;
pub use form_login::FormLoginAuthenticator;
pub use http_basic::HttpBasicAuthenticator;
pub use remember_me::RememberMeAuthenticator;

/// Whether an authenticator applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Support {
    /// Applies; credentials must be extractable.
    Supported,
    /// May apply; the decision is deferred until credentials are extracted.
    SupportedLazily,
    /// Does not apply.
    NotSupported,
}

impl Support {
    /// Whether this is anything other than [`Support::NotSupported`].
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::NotSupported)
    }

    /// Whether the decision was deferred.
    pub fn is_lazy(self) -> bool {
        matches!(self, Self::SupportedLazily)
    }
}

/// How the presented credentials are verified against the resolved user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialCheck {
    /// Compare the presented password with the stored hash.
    Password,
    /// Possession of the credential is proof enough (tokens, cookies).
    Token,
    /// Ask the authenticator via [`Authenticator::check_credentials`].
    Custom,
    /// No capability declared; verifying is a configuration error.
    Undeclared,
}

/// An authentication mechanism registered on a firewall.
///
/// Implementations are built once and shared across requests, so every
/// method takes `&self`.
#[async_trait]
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Stable key, unique within the firewall.
    fn key(&self) -> &str;

    /// Decide whether this authenticator applies. Must not mutate the request.
    fn supports(&self, request: &Request) -> Support;

    /// Extract credentials.
    ///
    /// `None` after an eager [`Support::Supported`] is invalid usage; after a
    /// lazy decision it means the authenticator does not apply after all.
    fn get_credentials(&self, request: &Request) -> SecurityResult<Option<Credentials>>;

    /// Resolve the user the credentials claim; `None` means unknown user.
    async fn get_user(&self, credentials: &Credentials) -> SecurityResult<Option<User>>;

    /// Which verification strategy applies to this authenticator.
    fn credential_check(&self) -> CredentialCheck {
        CredentialCheck::Undeclared
    }

    /// Verify credentials for [`CredentialCheck::Custom`].
    async fn check_credentials(
        &self,
        _credentials: &Credentials,
        _user: &User,
    ) -> SecurityResult<bool> {
        Err(SecurityError::misconfigured(
            self.key(),
            "declares custom credential checks but does not implement check_credentials",
        ))
    }

    /// Build the authenticated token for a verified user.
    fn create_authenticated_token(&self, user: User, firewall: &str) -> Token {
        let roles = user.roles.clone();
        Token::new(TokenKind::PostAuthentication, user, firewall, roles).with_authenticator(self.key())
    }

    /// Called once the token is stored; a response short-circuits the request.
    async fn on_authentication_success(
        &self,
        _request: &mut Request,
        _token: &Token,
        _firewall: &str,
    ) -> SecurityResult<Option<Response>> {
        Ok(None)
    }

    /// Called when authentication failed; a response short-circuits the request.
    async fn on_authentication_failure(
        &self,
        _request: &mut Request,
        _error: &AuthenticationError,
    ) -> SecurityResult<Option<Response>> {
        Ok(None)
    }

    /// Whether a successful login through this authenticator may issue a remember-me cookie.
    fn supports_remember_me(&self) -> bool {
        false
    }
}
