//! Token-based authentication path and the helper it shares with the manager.
//!
//! Hosts that split credential extraction from authentication hand the
//! manager a [`PreAuthenticationToken`] instead of a request; it is routed to
//! the authenticator that produced it. Both paths authenticate through
//! [`authenticate_via_authenticator`].

use std::sync::Arc;

use tracing::debug;

use warden_entity::token::{Token, TokenKind};

use crate::authenticator::Authenticator;
use crate::credentials::Credentials;
use crate::error::{AuthenticationError, SecurityError, SecurityResult};
use crate::events::EventDispatcher;
use crate::verifier::VerificationEvent;

/// Credentials extracted ahead of authentication, tagged with their origin.
#[derive(Debug, Clone)]
pub struct PreAuthenticationToken {
    credentials: Credentials,
    authenticator_key: String,
    firewall: String,
}

impl PreAuthenticationToken {
    /// Wrap credentials produced by the authenticator with `authenticator_key`.
    pub fn new(
        credentials: Credentials,
        authenticator_key: impl Into<String>,
        firewall: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            authenticator_key: authenticator_key.into(),
            firewall: firewall.into(),
        }
    }

    /// The wrapped credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Key of the originating authenticator.
    pub fn authenticator_key(&self) -> &str {
        &self.authenticator_key
    }

    /// Firewall name.
    pub fn firewall(&self) -> &str {
        &self.firewall
    }
}

/// What the provider is asked to authenticate.
#[derive(Debug, Clone)]
pub enum ProviderToken {
    /// Raw credentials awaiting authentication.
    PreAuthentication(PreAuthenticationToken),
    /// A token issued earlier, e.g. restored from the session.
    Established(Token),
}

/// Resolve, verify and tokenize credentials with one authenticator.
///
/// User checks, credential verification and password migration all run as
/// listeners on `events`.
pub(crate) async fn authenticate_via_authenticator(
    authenticator: &dyn Authenticator,
    credentials: &Credentials,
    events: &EventDispatcher,
    firewall: &str,
) -> SecurityResult<Token> {
    let user = authenticator.get_user(credentials).await?.ok_or_else(|| {
        AuthenticationError::UserNotFound {
            identifier: credentials.identifier().unwrap_or_default().to_string(),
        }
    })?;

    let outcome = {
        let mut event = VerificationEvent::new(authenticator, credentials, &user, firewall);
        events.verify_credentials(&mut event).await?;
        event.outcome()
    };

    match outcome {
        Some(true) => Ok(authenticator.create_authenticated_token(user, firewall)),
        Some(false) => Err(AuthenticationError::BadCredentials.into()),
        None => Err(SecurityError::misconfigured(
            authenticator.key(),
            "no listener decided whether the credentials are valid",
        )),
    }
}

/// Authenticates [`ProviderToken`]s for one firewall.
#[derive(Debug, Clone)]
pub struct PreAuthenticatedProvider {
    firewall: String,
    authenticators: Vec<Arc<dyn Authenticator>>,
    events: Arc<EventDispatcher>,
}

impl PreAuthenticatedProvider {
    /// Creates a provider over the firewall's authenticators.
    pub fn new(
        firewall: impl Into<String>,
        authenticators: Vec<Arc<dyn Authenticator>>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            firewall: firewall.into(),
            authenticators,
            events,
        }
    }

    /// Whether this provider is responsible for `token`.
    pub fn supports(&self, token: &ProviderToken) -> bool {
        match token {
            ProviderToken::PreAuthentication(pre) => pre.firewall() == self.firewall,
            ProviderToken::Established(token) => {
                token.kind() == TokenKind::PostAuthentication && token.firewall() == self.firewall
            }
        }
    }

    /// Authenticate `token`.
    ///
    /// - Established tokens are returned while authenticated and expire otherwise.
    /// - Pre-authentication tokens run through the authenticator that produced them.
    pub async fn authenticate(&self, token: ProviderToken) -> SecurityResult<Token> {
        match token {
            ProviderToken::Established(token) => {
                if token.kind() != TokenKind::PostAuthentication {
                    return Err(SecurityError::invalid_usage(format!(
                        "cannot authenticate a token of kind \"{}\"",
                        token.kind()
                    )));
                }
                if token.is_authenticated() {
                    Ok(token)
                } else {
                    debug!(user = %token.user_identifier(), "Established token is no longer authenticated");
                    Err(AuthenticationError::AuthenticationExpired.into())
                }
            }
            ProviderToken::PreAuthentication(pre) => {
                if pre.firewall() != self.firewall {
                    return Err(SecurityError::invalid_usage(format!(
                        "pre-authentication token for firewall \"{}\" given to firewall \"{}\"",
                        pre.firewall(),
                        self.firewall
                    )));
                }
                let authenticator = self
                    .authenticators
                    .iter()
                    .find(|a| a.key() == pre.authenticator_key())
                    .ok_or_else(|| AuthenticationError::AuthenticatorNotFound {
                        key: pre.authenticator_key().to_string(),
                    })?;

                authenticate_via_authenticator(
                    authenticator.as_ref(),
                    pre.credentials(),
                    &self.events,
                    &self.firewall,
                )
                .await
            }
        }
    }
}
