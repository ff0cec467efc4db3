//! The authenticator manager: selects, runs and reports on authenticators.
//!
//! A pipeline run has two phases:
//!
//! 1. [`AuthenticatorManager::supports`] asks every authenticator whether it
//!    applies and parks the candidates in the request's extensions.
//! 2. [`AuthenticatorManager::authenticate`] takes the candidates back out
//!    and executes the first one that still applies. Its outcome, success or
//!    failure, ends the run.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use warden_entity::token::Token;
use warden_entity::user::User;

use crate::authenticator::{Authenticator, Support};
use crate::error::{AuthenticationError, SecurityError, SecurityResult};
use crate::events::{
    EventDispatcher, InteractiveLoginEvent, LoginFailureEvent, LoginSuccessEvent, LogoutEvent,
};
use crate::provider::{PreAuthenticatedProvider, ProviderToken, authenticate_via_authenticator};
use crate::refresh::{TokenRefresher, stamp_fingerprint};
use crate::request::{Request, Response};

/// Authenticators selected by `supports`, scoped to the firewall that selected them.
#[derive(Clone)]
struct CandidateSet {
    firewall: String,
    authenticators: Vec<Arc<dyn Authenticator>>,
}

/// Result of one authenticator's execution.
enum Attempt {
    /// Lazy support turned out not to apply; try the next candidate.
    Skipped,
    /// The authenticator ran; its response (if any) ends the run.
    Completed(Option<Response>),
}

/// Outcome of [`AuthenticatorManager::authenticate_token`].
#[derive(Debug)]
pub enum TokenOutcome {
    /// The token is authenticated and stored.
    Authenticated(Token),
    /// The token expired; storage was cleared and logout listeners ran.
    LoggedOut(Option<Response>),
    /// Authentication failed.
    Failed(AuthenticationError),
}

/// Runs the authenticators of one firewall.
///
/// Immutable after construction and safe to share between concurrent
/// requests; all per-request state lives on the [`Request`].
#[derive(Debug)]
pub struct AuthenticatorManager {
    firewall: String,
    authenticators: Vec<Arc<dyn Authenticator>>,
    events: Arc<EventDispatcher>,
    provider: PreAuthenticatedProvider,
    refresher: Option<TokenRefresher>,
    erase_credentials: bool,
    hide_user_not_found: bool,
}

impl AuthenticatorManager {
    /// Creates a manager; authenticator keys must be unique.
    pub fn new(
        firewall: impl Into<String>,
        authenticators: Vec<Arc<dyn Authenticator>>,
        events: Arc<EventDispatcher>,
    ) -> SecurityResult<Self> {
        let firewall = firewall.into();

        let mut keys = HashSet::new();
        for authenticator in &authenticators {
            if !keys.insert(authenticator.key()) {
                return Err(SecurityError::misconfigured(
                    authenticator.key(),
                    format!("key is registered twice on firewall \"{firewall}\""),
                ));
            }
        }

        let provider =
            PreAuthenticatedProvider::new(&firewall, authenticators.clone(), Arc::clone(&events));

        Ok(Self {
            firewall,
            authenticators,
            events,
            provider,
            refresher: None,
            erase_credentials: true,
            hide_user_not_found: true,
        })
    }

    /// Reload users of established tokens before trusting them again.
    pub fn with_token_refresher(mut self, refresher: TokenRefresher) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Whether to wipe secrets from tokens before storing them.
    pub fn with_erase_credentials(mut self, erase: bool) -> Self {
        self.erase_credentials = erase;
        self
    }

    /// Whether unknown users and account-status failures are reported as bad credentials.
    pub fn with_hide_user_not_found(mut self, hide: bool) -> Self {
        self.hide_user_not_found = hide;
        self
    }

    /// Firewall name.
    pub fn firewall(&self) -> &str {
        &self.firewall
    }

    /// Registered authenticators, in precedence order.
    pub fn authenticators(&self) -> &[Arc<dyn Authenticator>] {
        &self.authenticators
    }

    /// The event dispatcher.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Select the authenticators that apply to `request`.
    ///
    /// Returns [`Support::SupportedLazily`] only when every candidate is lazy.
    pub fn supports(&self, request: &mut Request) -> Support {
        let mut candidates = Vec::new();
        let mut lazy = true;

        for authenticator in &self.authenticators {
            let support = authenticator.supports(request);
            debug!(
                firewall = %self.firewall,
                authenticator = %authenticator.key(),
                ?support,
                "Checking support on authenticator"
            );
            match support {
                Support::Supported => {
                    lazy = false;
                    candidates.push(Arc::clone(authenticator));
                }
                Support::SupportedLazily => candidates.push(Arc::clone(authenticator)),
                Support::NotSupported => {}
            }
        }

        if candidates.is_empty() {
            debug!(firewall = %self.firewall, "No authenticator supports the request");
            request.extensions_mut().remove::<CandidateSet>();
            return Support::NotSupported;
        }

        request.extensions_mut().insert(CandidateSet {
            firewall: self.firewall.clone(),
            authenticators: candidates,
        });

        if lazy {
            Support::SupportedLazily
        } else {
            Support::Supported
        }
    }

    /// Run the candidates selected by [`supports`](Self::supports).
    ///
    /// Returns the response that should end the request, if any.
    pub async fn authenticate(&self, request: &mut Request) -> SecurityResult<Option<Response>> {
        let candidates = match request.extensions_mut().remove::<CandidateSet>() {
            Some(set) if set.firewall == self.firewall => set.authenticators,
            Some(set) => {
                debug!(
                    firewall = %self.firewall,
                    selected_by = %set.firewall,
                    "Ignoring candidates selected by another firewall"
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        for authenticator in &candidates {
            let support = authenticator.supports(request);
            if !support.is_supported() {
                debug!(
                    firewall = %self.firewall,
                    authenticator = %authenticator.key(),
                    "Skipping the authenticator as it no longer supports the request"
                );
                continue;
            }

            match self.execute_authenticator(authenticator, support, request).await? {
                Attempt::Skipped => continue,
                Attempt::Completed(response) => {
                    if response.is_some() {
                        debug!(
                            firewall = %self.firewall,
                            authenticator = %authenticator.key(),
                            "Authenticator set a response, stopping the pipeline"
                        );
                    }
                    return Ok(response);
                }
            }
        }

        Ok(None)
    }

    /// Log `user` in through the authenticator with `authenticator_key`, skipping verification.
    pub async fn authenticate_user(
        &self,
        user: User,
        authenticator_key: &str,
        request: &mut Request,
    ) -> SecurityResult<Option<Response>> {
        let authenticator = self
            .authenticators
            .iter()
            .find(|a| a.key() == authenticator_key)
            .ok_or_else(|| {
                SecurityError::invalid_usage(format!(
                    "no authenticator \"{authenticator_key}\" on firewall \"{}\"",
                    self.firewall
                ))
            })?;

        let token = authenticator.create_authenticated_token(user, &self.firewall);
        self.handle_success(authenticator, token, request).await
    }

    /// Authenticate a pre-built token through the provider path.
    ///
    /// - Success stores the token.
    /// - Expired authentication clears storage and notifies logout listeners.
    /// - Other authentication failures are returned, never raised.
    pub async fn authenticate_token(
        &self,
        request: &mut Request,
        token: ProviderToken,
    ) -> SecurityResult<TokenOutcome> {
        if !self.provider.supports(&token) {
            return Err(SecurityError::invalid_usage(format!(
                "firewall \"{}\" cannot authenticate this token type",
                self.firewall
            )));
        }

        let token = match token {
            ProviderToken::Established(token) => {
                ProviderToken::Established(self.refresh_token(token).await?)
            }
            pre => pre,
        };

        match self.provider.authenticate(token).await {
            Ok(mut token) => {
                stamp_fingerprint(&mut token);
                if self.erase_credentials {
                    token.erase_credentials();
                }
                request.token_storage().set_token(Some(token.clone()));
                Ok(TokenOutcome::Authenticated(token))
            }
            Err(SecurityError::Authentication(AuthenticationError::AuthenticationExpired)) => {
                warn!(firewall = %self.firewall, "Authentication expired, logging out");
                let response = self.logout(request).await;
                Ok(TokenOutcome::LoggedOut(response))
            }
            Err(SecurityError::Authentication(error)) => {
                info!(firewall = %self.firewall, error = %error, "Token authentication failed");
                Ok(TokenOutcome::Failed(error))
            }
            Err(e) => Err(e),
        }
    }

    /// Deauthenticate `token` if its user changed since it was issued.
    ///
    /// Without a configured refresher the token is returned as is.
    pub async fn refresh_token(&self, token: Token) -> SecurityResult<Token> {
        match &self.refresher {
            Some(refresher) => refresher.refresh(token).await,
            None => Ok(token),
        }
    }

    /// Clear the stored token and notify logout listeners.
    pub async fn logout(&self, request: &mut Request) -> Option<Response> {
        let previous = request.token_storage().token();
        request.token_storage().set_token(None);

        let mut event = LogoutEvent {
            request,
            token: previous.as_ref(),
            firewall: &self.firewall,
            response: None,
        };
        self.events.logout(&mut event).await;
        event.response
    }

    async fn execute_authenticator(
        &self,
        authenticator: &Arc<dyn Authenticator>,
        support: Support,
        request: &mut Request,
    ) -> SecurityResult<Attempt> {
        let credentials = match authenticator.get_credentials(request) {
            Ok(Some(credentials)) => credentials,
            Ok(None) if support.is_lazy() => {
                debug!(
                    firewall = %self.firewall,
                    authenticator = %authenticator.key(),
                    "Lazy authenticator found no credentials, skipping"
                );
                return Ok(Attempt::Skipped);
            }
            Ok(None) => {
                return Err(SecurityError::invalid_usage(format!(
                    "authenticator \"{}\" returned no credentials after declaring support",
                    authenticator.key()
                )));
            }
            Err(SecurityError::Authentication(error)) => {
                let response = self.handle_failure(authenticator, error, request).await?;
                return Ok(Attempt::Completed(response));
            }
            Err(e) => return Err(e),
        };

        let result = authenticate_via_authenticator(
            authenticator.as_ref(),
            &credentials,
            &self.events,
            &self.firewall,
        )
        .await;
        drop(credentials);

        let response = match result {
            Ok(token) => self.handle_success(authenticator, token, request).await?,
            Err(SecurityError::Authentication(error)) => {
                self.handle_failure(authenticator, error, request).await?
            }
            Err(e) => return Err(e),
        };
        Ok(Attempt::Completed(response))
    }

    async fn handle_success(
        &self,
        authenticator: &Arc<dyn Authenticator>,
        mut token: Token,
        request: &mut Request,
    ) -> SecurityResult<Option<Response>> {
        stamp_fingerprint(&mut token);
        if self.erase_credentials {
            token.erase_credentials();
        }
        request.token_storage().set_token(Some(token.clone()));

        info!(
            firewall = %self.firewall,
            authenticator = %authenticator.key(),
            user = %token.user_identifier(),
            "Authenticator successful"
        );

        let mut interactive = InteractiveLoginEvent {
            request: &mut *request,
            token: &token,
            firewall: &self.firewall,
        };
        self.events.interactive_login(&mut interactive).await;

        let response = authenticator
            .on_authentication_success(request, &token, &self.firewall)
            .await?;

        let mut event = LoginSuccessEvent {
            authenticator: authenticator.as_ref(),
            token: &token,
            firewall: &self.firewall,
            request,
            response,
        };
        self.events.login_success(&mut event).await;
        Ok(event.response)
    }

    async fn handle_failure(
        &self,
        authenticator: &Arc<dyn Authenticator>,
        error: AuthenticationError,
        request: &mut Request,
    ) -> SecurityResult<Option<Response>> {
        let error = match error {
            AuthenticationError::UserNotFound { .. } if self.hide_user_not_found => {
                AuthenticationError::BadCredentials
            }
            e if self.hide_user_not_found && e.is_account_status() => {
                AuthenticationError::BadCredentials
            }
            e => e,
        };

        info!(
            firewall = %self.firewall,
            authenticator = %authenticator.key(),
            error = %error,
            "Authenticator failed"
        );

        let response = authenticator
            .on_authentication_failure(request, &error)
            .await?;

        let mut event = LoginFailureEvent {
            authenticator: authenticator.as_ref(),
            error: &error,
            firewall: &self.firewall,
            request,
            response,
        };
        self.events.login_failure(&mut event).await;
        Ok(event.response)
    }
}
