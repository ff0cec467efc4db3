//! Firewall assembly: turns a [`FirewallConfig`] into a ready manager.

use std::sync::Arc;

use tracing::{debug, info};

use warden_core::config::FirewallConfig;

use crate::authenticator::{
    AccessTokenAuthenticator, AnonymousAuthenticator, Authenticator, FormLoginAuthenticator,
    HttpBasicAuthenticator, RememberMeAuthenticator, StaticAccessTokenHandler, Support,
};
use crate::error::SecurityResult;
use crate::events::{AuthListener, EventDispatcher};
use crate::listeners::{
    LoginAuditListener, PasswordMigrationListener, RememberMeListener, SessionStrategyListener,
};
use crate::manager::AuthenticatorManager;
use crate::password::{Argon2PasswordHasher, PasswordMatcher};
use crate::remember_me::{RememberMeService, SignedRememberMeService};
use crate::request::{Request, Response};
use crate::refresh::TokenRefresher;
use crate::user_provider::InMemoryUserProvider;
use crate::verifier::{CredentialsVerifier, DefaultUserChecker, UserChecker, UserCheckerListener};

/// A configured firewall.
#[derive(Debug)]
pub struct Firewall {
    name: String,
    manager: AuthenticatorManager,
    users: Arc<InMemoryUserProvider>,
}

impl Firewall {
    /// Start building a firewall from configuration.
    pub fn builder(config: FirewallConfig) -> FirewallBuilder {
        FirewallBuilder::new(config)
    }

    /// Firewall name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying manager.
    pub fn manager(&self) -> &AuthenticatorManager {
        &self.manager
    }

    /// The in-memory user store backing the built-in authenticators.
    pub fn users(&self) -> &Arc<InMemoryUserProvider> {
        &self.users
    }

    /// Run the authentication pipeline for one request.
    pub async fn handle(&self, request: &mut Request) -> SecurityResult<Option<Response>> {
        match self.manager.supports(request) {
            Support::NotSupported => Ok(None),
            _ => self.manager.authenticate(request).await,
        }
    }

    /// Log the current token out.
    pub async fn logout(&self, request: &mut Request) -> Option<Response> {
        self.manager.logout(request).await
    }
}

/// Assembles a [`Firewall`]; every collaborator has a configured default.
#[derive(Debug)]
pub struct FirewallBuilder {
    config: FirewallConfig,
    matcher: Option<Arc<dyn PasswordMatcher>>,
    user_checker: Option<Arc<dyn UserChecker>>,
    users: Option<Arc<InMemoryUserProvider>>,
    authenticators: Vec<Arc<dyn Authenticator>>,
    listeners: Vec<Arc<dyn AuthListener>>,
}

impl FirewallBuilder {
    fn new(config: FirewallConfig) -> Self {
        Self {
            config,
            matcher: None,
            user_checker: None,
            users: None,
            authenticators: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Use `matcher` instead of Argon2 for password checks.
    pub fn password_matcher(mut self, matcher: Arc<dyn PasswordMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Use `checker` instead of [`DefaultUserChecker`].
    pub fn user_checker(mut self, checker: Arc<dyn UserChecker>) -> Self {
        self.user_checker = Some(checker);
        self
    }

    /// Use an existing user store instead of one built from the configured users.
    pub fn users(mut self, users: Arc<InMemoryUserProvider>) -> Self {
        self.users = Some(users);
        self
    }

    /// Register an extra authenticator, tried after the built-in credential authenticators.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticators.push(authenticator);
        self
    }

    /// Register an extra listener.
    pub fn listener(mut self, listener: Arc<dyn AuthListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validate the configuration and assemble the firewall.
    pub fn build(self) -> SecurityResult<Firewall> {
        let config = self.config;
        config.validate()?;
        let name = config.name.clone();

        let users = self
            .users
            .unwrap_or_else(|| Arc::new(InMemoryUserProvider::from_config(&config.users)));
        let matcher = self
            .matcher
            .unwrap_or_else(|| Arc::new(Argon2PasswordHasher::new()));
        let checker = self
            .user_checker
            .unwrap_or_else(|| Arc::new(DefaultUserChecker));

        let remember_me: Option<Arc<dyn RememberMeService>> =
            config.remember_me.as_ref().map(|rm| {
                Arc::new(SignedRememberMeService::new(rm, users.clone())) as Arc<dyn RememberMeService>
            });

        let mut events = EventDispatcher::new()
            .with_listener(Arc::new(UserCheckerListener::pre(checker.clone())))
            .with_listener(Arc::new(CredentialsVerifier::new(matcher.clone())))
            .with_listener(Arc::new(UserCheckerListener::post(checker.clone())))
            .with_listener(Arc::new(PasswordMigrationListener::new(matcher, users.clone())))
            .with_listener(Arc::new(SessionStrategyListener::new(
                config.session_fixation_strategy,
                config.stateless,
            )))
            .with_listener(Arc::new(LoginAuditListener));
        if let (Some(service), Some(rm)) = (&remember_me, &config.remember_me) {
            events.register(Arc::new(RememberMeListener::new(service.clone(), rm)));
        }
        for listener in self.listeners {
            events.register(listener);
        }

        let mut authenticators: Vec<Arc<dyn Authenticator>> = Vec::new();
        if let Some(form) = &config.form_login {
            authenticators.push(Arc::new(FormLoginAuthenticator::new(
                &name,
                form.clone(),
                users.clone(),
            )));
        }
        if let Some(basic) = &config.http_basic {
            authenticators.push(Arc::new(HttpBasicAuthenticator::new(
                &name,
                basic.realm.clone(),
                users.clone(),
            )));
        }
        if let Some(tokens) = &config.access_token {
            authenticators.push(Arc::new(AccessTokenAuthenticator::new(
                &name,
                Arc::new(StaticAccessTokenHandler::new(tokens.tokens.clone())),
                users.clone(),
            )));
        }
        authenticators.extend(self.authenticators);
        if let Some(service) = remember_me {
            authenticators.push(Arc::new(RememberMeAuthenticator::new(&name, service)));
        }
        if config.anonymous {
            authenticators.push(Arc::new(AnonymousAuthenticator::new(&name)));
        }

        for authenticator in &authenticators {
            debug!(firewall = %name, authenticator = %authenticator.key(), "Registered authenticator");
        }

        let manager = AuthenticatorManager::new(&name, authenticators, Arc::new(events))?
            .with_erase_credentials(config.erase_credentials)
            .with_hide_user_not_found(config.hide_user_not_found)
            .with_token_refresher(TokenRefresher::new(users.clone(), checker));

        info!(
            firewall = %name,
            authenticators = manager.authenticators().len(),
            listeners = manager.events().listeners().len(),
            users = users.len(),
            "Firewall ready"
        );

        Ok(Firewall {
            name,
            manager,
            users,
        })
    }
}
